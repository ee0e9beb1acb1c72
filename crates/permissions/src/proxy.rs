//! `WalletInterface` for the manager: each wallet call gated by its check.

use crate::{
    Error, LineItem, LineItemKind, PermissionCategory, PermissionsManager, ResourceDescriptor,
    Result, Seek,
};
use std::collections::BTreeMap;
use wallet::{
    AbortActionArgs, AbortActionResult, AcquireCertificateArgs, AuthenticatedResult,
    Counterparty, CreateActionArgs, CreateActionResult, CreateHmacArgs, CreateHmacResult,
    CreateSignatureArgs, CreateSignatureResult, DecryptArgs, DecryptResult,
    DiscoverByAttributesArgs, DiscoverByIdentityKeyArgs, DiscoverCertificatesResult, EncryptArgs,
    EncryptResult, GetHeaderArgs, GetHeaderResult, GetHeightResult, GetNetworkResult,
    GetPublicKeyArgs, GetPublicKeyResult, GetVersionResult, InternalizeActionArgs,
    InternalizeActionResult, InternalizeProtocol, KeyLinkageResult, ListActionsArgs,
    ListActionsResult, ListCertificatesArgs, ListCertificatesResult, ListOutputsArgs,
    ListOutputsResult, Protocol, ProveCertificateArgs, ProveCertificateResult,
    RelinquishCertificateArgs, RelinquishCertificateResult, RelinquishOutputArgs,
    RelinquishOutputResult, RevealCounterpartyKeyLinkageArgs, RevealSpecificKeyLinkageArgs,
    SecurityLevel, SignActionArgs, SignActionResult, VerifyHmacArgs, VerifyHmacResult,
    VerifySignatureArgs, VerifySignatureResult, WalletCertificate, WalletInterface,
};

/// Label appended to every action a non-admin originator creates.
fn originator_label(originator: &str) -> String {
    format!("admin originator {originator}")
}

/// What an action costs the wallet: outputs and fee, less the caller's own inputs.
fn net_spend(args: &CreateActionArgs, fee: u64) -> (u64, Vec<LineItem>) {
    let mut line_items = Vec::new();
    let mut outgoing: u64 = 0;
    let mut incoming: u64 = 0;

    for output in &args.outputs {
        outgoing = outgoing.saturating_add(output.satoshis);
        line_items.push(LineItem {
            kind: LineItemKind::Output,
            description: output.output_description.clone(),
            satoshis: output.satoshis,
        });
    }
    if fee > 0 {
        outgoing = outgoing.saturating_add(fee);
        line_items.push(LineItem {
            kind: LineItemKind::Fee,
            description: "network fee".to_string(),
            satoshis: fee,
        });
    }
    for input in &args.inputs {
        if let Some(satoshis) = input.source_satoshis {
            incoming = incoming.saturating_add(satoshis);
            line_items.push(LineItem {
                kind: LineItemKind::Input,
                description: input.input_description.clone(),
                satoshis,
            });
        }
    }

    (outgoing.saturating_sub(incoming), line_items)
}

impl<W> PermissionsManager<W>
where
    W: WalletInterface<Error = wallet::Error>,
{
    async fn ensure_labels(&self, originator: &str, labels: &[String], seek: Seek) -> Result<()> {
        for label in labels {
            self.ensure_label(originator, label, seek).await?;
        }
        Ok(())
    }

    async fn abort_staged(&self, reference: &str, originator: &str) {
        let args = AbortActionArgs {
            reference: reference.to_string(),
        };
        match self.wallet.abort_action(args, originator).await {
            Ok(_) => tracing::debug!(reference, "aborted staged action"),
            Err(e) => tracing::warn!(reference, error = %e, "failed to abort staged action"),
        }
    }
}

impl<W> WalletInterface for PermissionsManager<W>
where
    W: WalletInterface<Error = wallet::Error>,
{
    type Error = Error;

    async fn create_action(
        &self,
        args: CreateActionArgs,
        originator: &str,
    ) -> Result<CreateActionResult> {
        if self.is_admin(originator) {
            return Ok(self.wallet.create_action(args, originator).await?);
        }

        self.ensure_labels(originator, &args.labels, Seek::ApplyingActionLabels)
            .await?;
        for output in &args.outputs {
            if let Some(basket) = &output.basket {
                self.ensure_basket(originator, basket, Seek::BasketInsertion)
                    .await?;
            }
        }

        let mut staged = args.clone();
        staged.labels.push(originator_label(originator));
        if self.config.encrypt_wallet_metadata {
            self.cipher().encrypt_action(&mut staged).await?;
        }

        if !self.config.seek_spending_authorization {
            return Ok(self.wallet.create_action(staged, originator).await?);
        }

        let sign_and_process = args.options.sign_and_process.unwrap_or(true);
        staged.options.sign_and_process = Some(false);
        let created = self.wallet.create_action(staged, originator).await?;
        let Some(signable) = created.signable_transaction.as_ref() else {
            return Err(Error::InvalidWalletResponse(
                "staged action has no signable transaction".to_string(),
            ));
        };

        let (amount, line_items) = net_spend(&args, signable.fee);
        let mut charged = None;
        if amount > 0 {
            let reason = Some(args.description.clone());
            match self
                .ensure_spending(originator, amount, line_items, reason)
                .await
            {
                Ok(token) => charged = token,
                Err(e) => {
                    self.abort_staged(&signable.reference, originator).await;
                    return Err(e);
                }
            }
        }

        if !sign_and_process {
            return Ok(created);
        }
        let signed = match self
            .wallet
            .sign_action(
                SignActionArgs {
                    reference: signable.reference.clone(),
                    spends: BTreeMap::new(),
                    options: (&args.options).into(),
                },
                originator,
            )
            .await
        {
            Ok(signed) => signed,
            Err(e) => {
                // Nothing was spent; release the inputs and the budget.
                self.abort_staged(&signable.reference, originator).await;
                if let Some(token) = &charged {
                    self.refund_spending(token, amount);
                }
                return Err(e.into());
            }
        };
        Ok(CreateActionResult {
            txid: signed.txid,
            tx: signed.tx,
            signable_transaction: None,
        })
    }

    async fn sign_action(&self, args: SignActionArgs, originator: &str) -> Result<SignActionResult> {
        Ok(self.wallet.sign_action(args, originator).await?)
    }

    async fn abort_action(&self, args: AbortActionArgs, originator: &str) -> Result<AbortActionResult> {
        Ok(self.wallet.abort_action(args, originator).await?)
    }

    async fn list_actions(&self, args: ListActionsArgs, originator: &str) -> Result<ListActionsResult> {
        if self.is_admin(originator) {
            return Ok(self.wallet.list_actions(args, originator).await?);
        }

        self.ensure_labels(originator, &args.labels, Seek::ListingActionsByLabel)
            .await?;
        // Records keep whatever form they were written in, so decrypt
        // regardless of the current setting.
        let mut result = self.wallet.list_actions(args, originator).await?;
        self.cipher().decrypt_actions(&mut result.actions).await;
        Ok(result)
    }

    async fn internalize_action(
        &self,
        args: InternalizeActionArgs,
        originator: &str,
    ) -> Result<InternalizeActionResult> {
        if self.is_admin(originator) {
            return Ok(self.wallet.internalize_action(args, originator).await?);
        }

        self.ensure_labels(originator, &args.labels, Seek::ApplyingActionLabels)
            .await?;
        for output in &args.outputs {
            if let InternalizeProtocol::BasketInsertion {
                insertion_remittance,
            } = &output.protocol
            {
                self.ensure_basket(originator, &insertion_remittance.basket, Seek::BasketInsertion)
                    .await?;
            }
        }

        let mut staged = args.clone();
        staged.labels.push(originator_label(originator));
        if self.config.encrypt_wallet_metadata {
            self.cipher().encrypt_internalization(&mut staged).await?;
        }
        Ok(self.wallet.internalize_action(staged, originator).await?)
    }

    async fn list_outputs(&self, args: ListOutputsArgs, originator: &str) -> Result<ListOutputsResult> {
        if self.is_admin(originator) {
            return Ok(self.wallet.list_outputs(args, originator).await?);
        }

        self.ensure_basket(originator, &args.basket, Seek::BasketListing)
            .await?;
        let mut result = self.wallet.list_outputs(args, originator).await?;
        self.cipher().decrypt_outputs(&mut result.outputs).await;
        Ok(result)
    }

    async fn relinquish_output(
        &self,
        args: RelinquishOutputArgs,
        originator: &str,
    ) -> Result<RelinquishOutputResult> {
        if !self.is_admin(originator) {
            self.ensure_basket(originator, &args.basket, Seek::BasketRemoval)
                .await?;
        }
        Ok(self.wallet.relinquish_output(args, originator).await?)
    }

    async fn get_public_key(
        &self,
        args: GetPublicKeyArgs,
        originator: &str,
    ) -> Result<GetPublicKeyResult> {
        if !self.is_admin(originator) {
            if args.identity_key {
                let protocol = Protocol::new(SecurityLevel::App, "identity key retrieval");
                self.ensure_protocol(
                    originator,
                    protocol,
                    None,
                    false,
                    Seek::IdentityKeyRevelation,
                    true,
                )
                .await?;
            } else {
                let Some(key) = &args.key else {
                    return Err(Error::PermissionDenied {
                        category: PermissionCategory::ProtocolUsage,
                        resource: "public key".to_string(),
                        reason: Some("no protocol given for a derived key".to_string()),
                    });
                };
                self.ensure_key(originator, key, Seek::PublicKeyRevelation)
                    .await?;
            }
        }
        Ok(self.wallet.get_public_key(args, originator).await?)
    }

    async fn reveal_counterparty_key_linkage(
        &self,
        args: RevealCounterpartyKeyLinkageArgs,
        originator: &str,
    ) -> Result<KeyLinkageResult> {
        if !self.is_admin(originator) {
            let protocol = Protocol::new(
                SecurityLevel::Counterparty,
                "counterparty key linkage revelation",
            );
            self.ensure_protocol(
                originator,
                protocol,
                Some(Counterparty::from(args.verifier.as_str())),
                args.privileged,
                Seek::KeyLinkageRevelation,
                true,
            )
            .await?;
        }
        Ok(self
            .wallet
            .reveal_counterparty_key_linkage(args, originator)
            .await?)
    }

    async fn reveal_specific_key_linkage(
        &self,
        args: RevealSpecificKeyLinkageArgs,
        originator: &str,
    ) -> Result<KeyLinkageResult> {
        if !self.is_admin(originator) {
            let revealed = &args.key.protocol_id;
            let protocol = Protocol::new(
                SecurityLevel::Counterparty,
                format!(
                    "specific key linkage revelation {} {}",
                    revealed.security_level, revealed.name
                ),
            );
            self.ensure_protocol(
                originator,
                protocol,
                Some(Counterparty::from(args.verifier.as_str())),
                args.key.privileged,
                Seek::KeyLinkageRevelation,
                args.key.seek_permission.unwrap_or(true),
            )
            .await?;
        }
        Ok(self
            .wallet
            .reveal_specific_key_linkage(args, originator)
            .await?)
    }

    async fn encrypt(&self, args: EncryptArgs, originator: &str) -> Result<EncryptResult> {
        if !self.is_admin(originator) {
            self.ensure_key(originator, &args.key, Seek::Encrypting)
                .await?;
        }
        Ok(self.wallet.encrypt(args, originator).await?)
    }

    async fn decrypt(&self, args: DecryptArgs, originator: &str) -> Result<DecryptResult> {
        if !self.is_admin(originator) {
            self.ensure_key(originator, &args.key, Seek::Encrypting)
                .await?;
        }
        Ok(self.wallet.decrypt(args, originator).await?)
    }

    async fn create_hmac(&self, args: CreateHmacArgs, originator: &str) -> Result<CreateHmacResult> {
        if !self.is_admin(originator) {
            self.ensure_key(originator, &args.key, Seek::Hmac).await?;
        }
        Ok(self.wallet.create_hmac(args, originator).await?)
    }

    async fn verify_hmac(&self, args: VerifyHmacArgs, originator: &str) -> Result<VerifyHmacResult> {
        if !self.is_admin(originator) {
            self.ensure_key(originator, &args.key, Seek::Hmac).await?;
        }
        Ok(self.wallet.verify_hmac(args, originator).await?)
    }

    async fn create_signature(
        &self,
        args: CreateSignatureArgs,
        originator: &str,
    ) -> Result<CreateSignatureResult> {
        if !self.is_admin(originator) {
            self.ensure_key(originator, &args.key, Seek::Signing)
                .await?;
        }
        Ok(self.wallet.create_signature(args, originator).await?)
    }

    async fn verify_signature(
        &self,
        args: VerifySignatureArgs,
        originator: &str,
    ) -> Result<VerifySignatureResult> {
        if !self.is_admin(originator) {
            self.ensure_key(originator, &args.key, Seek::Signing)
                .await?;
        }
        Ok(self.wallet.verify_signature(args, originator).await?)
    }

    async fn acquire_certificate(
        &self,
        args: AcquireCertificateArgs,
        originator: &str,
    ) -> Result<WalletCertificate> {
        if !self.is_admin(originator) {
            let protocol = Protocol::new(
                SecurityLevel::App,
                format!("certificate acquisition {}", args.cert_type),
            );
            self.ensure_protocol(
                originator,
                protocol,
                None,
                args.privileged,
                Seek::CertificateAcquisition,
                true,
            )
            .await?;
        }
        Ok(self.wallet.acquire_certificate(args, originator).await?)
    }

    async fn list_certificates(
        &self,
        args: ListCertificatesArgs,
        originator: &str,
    ) -> Result<ListCertificatesResult> {
        if !self.is_admin(originator) {
            let protocol = Protocol::new(SecurityLevel::App, "certificate list");
            self.ensure_protocol(
                originator,
                protocol,
                None,
                args.privileged,
                Seek::CertificateListing,
                true,
            )
            .await?;
        }
        Ok(self.wallet.list_certificates(args, originator).await?)
    }

    async fn prove_certificate(
        &self,
        args: ProveCertificateArgs,
        originator: &str,
    ) -> Result<ProveCertificateResult> {
        if !self.is_admin(originator) {
            let descriptor = ResourceDescriptor::Certificate {
                cert_type: args.certificate.cert_type.clone(),
                certifier: args.certificate.certifier.clone(),
                verifier: args.verifier.clone(),
                fields: args.fields_to_reveal.clone(),
                privileged: args.privileged,
                reason: args.privileged_reason.clone(),
            };
            self.ensure(originator, descriptor, Seek::CertificateDisclosure, true)
                .await?;
        }
        Ok(self.wallet.prove_certificate(args, originator).await?)
    }

    async fn relinquish_certificate(
        &self,
        args: RelinquishCertificateArgs,
        originator: &str,
    ) -> Result<RelinquishCertificateResult> {
        if !self.is_admin(originator) {
            let protocol = Protocol::new(
                SecurityLevel::App,
                format!("certificate relinquishment {}", args.cert_type),
            );
            self.ensure_protocol(
                originator,
                protocol,
                None,
                false,
                Seek::CertificateRelinquishment,
                true,
            )
            .await?;
        }
        Ok(self.wallet.relinquish_certificate(args, originator).await?)
    }

    async fn discover_by_identity_key(
        &self,
        args: DiscoverByIdentityKeyArgs,
        originator: &str,
    ) -> Result<DiscoverCertificatesResult> {
        if !self.is_admin(originator) {
            let protocol = Protocol::new(SecurityLevel::App, "identity resolution");
            self.ensure_protocol(
                originator,
                protocol,
                None,
                false,
                Seek::IdentityResolution,
                args.seek_permission.unwrap_or(true),
            )
            .await?;
        }
        Ok(self.wallet.discover_by_identity_key(args, originator).await?)
    }

    async fn discover_by_attributes(
        &self,
        args: DiscoverByAttributesArgs,
        originator: &str,
    ) -> Result<DiscoverCertificatesResult> {
        if !self.is_admin(originator) {
            let protocol = Protocol::new(SecurityLevel::App, "identity resolution");
            self.ensure_protocol(
                originator,
                protocol,
                None,
                false,
                Seek::IdentityResolution,
                args.seek_permission.unwrap_or(true),
            )
            .await?;
        }
        Ok(self.wallet.discover_by_attributes(args, originator).await?)
    }

    async fn is_authenticated(&self, originator: &str) -> Result<AuthenticatedResult> {
        Ok(self.wallet.is_authenticated(originator).await?)
    }

    async fn wait_for_authentication(&self, originator: &str) -> Result<AuthenticatedResult> {
        Ok(self.wallet.wait_for_authentication(originator).await?)
    }

    async fn get_height(&self, originator: &str) -> Result<GetHeightResult> {
        Ok(self.wallet.get_height(originator).await?)
    }

    async fn get_header_for_height(
        &self,
        args: GetHeaderArgs,
        originator: &str,
    ) -> Result<GetHeaderResult> {
        Ok(self.wallet.get_header_for_height(args, originator).await?)
    }

    async fn get_network(&self, originator: &str) -> Result<GetNetworkResult> {
        Ok(self.wallet.get_network(originator).await?)
    }

    async fn get_version(&self, originator: &str) -> Result<GetVersionResult> {
        Ok(self.wallet.get_version(originator).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockWallet};
    use crate::{
        GrantAmendments, METADATA_KEY_ID, PermissionRequest, PermissionToken, PermissionsConfig,
        metadata_protocol,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wallet::{CreateActionInput, CreateActionOptions, CreateActionOutput, KeyDerivation};

    const ADMIN: &str = "admin.local";
    const APP: &str = "app.example";

    fn spending_only() -> PermissionsConfig {
        PermissionsConfig {
            seek_spending_authorization: true,
            ..PermissionsConfig::permissive()
        }
    }

    fn pay_rent() -> CreateActionArgs {
        CreateActionArgs {
            description: "pay rent".to_string(),
            outputs: vec![CreateActionOutput {
                locking_script: "76a914".to_string(),
                satoshis: 500,
                output_description: "rent".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn counting_requests<W>(manager: &PermissionsManager<W>) -> Arc<AtomicUsize> {
        let seen = Arc::new(AtomicUsize::new(0));
        for category in [
            PermissionCategory::ProtocolUsage,
            PermissionCategory::BasketInsertion,
            PermissionCategory::CertificateDisclosure,
            PermissionCategory::SpendingAuthorization,
        ] {
            let seen = seen.clone();
            let responder = manager.responder();
            manager.bind_callback(category, move |request: &PermissionRequest| {
                seen.fetch_add(1, Ordering::SeqCst);
                responder.deny(request.id, None)?;
                Ok(())
            });
        }
        seen
    }

    fn grant_spending<W>(manager: &PermissionsManager<W>, limit: u64) {
        let responder = manager.responder();
        manager.bind_callback(
            PermissionCategory::SpendingAuthorization,
            move |request: &PermissionRequest| {
                responder.grant(request.id, GrantAmendments::default().with_spending_limit(limit))?;
                Ok(())
            },
        );
    }

    #[tokio::test]
    async fn admin_calls_pass_through_untouched() {
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, PermissionsConfig::default());
        let seen = counting_requests(&manager);

        let mut args = pay_rent();
        args.outputs[0].basket = Some("default".to_string());
        args.labels = vec!["admin audit".to_string()];
        manager.create_action(args.clone(), ADMIN).await.unwrap();
        manager
            .create_signature(
                CreateSignatureArgs {
                    key: KeyDerivation::new(
                        Protocol::new(SecurityLevel::Counterparty, "admin metadata encryption"),
                        "1",
                    ),
                    data: Some(vec![1, 2, 3]),
                    hash_to_directly_sign: None,
                },
                ADMIN,
            )
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert!(manager.pending_requests().is_empty());
        assert_eq!(manager.wallet().created(), vec![args]);
        assert_eq!(manager.wallet().encrypt_count(), 0);
        assert!(manager.wallet().was_called("create_signature"));
    }

    #[tokio::test]
    async fn disabled_checks_never_raise_requests() {
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, PermissionsConfig::permissive());
        let seen = counting_requests(&manager);

        let mut args = pay_rent();
        args.outputs[0].basket = Some("todo tokens".to_string());
        args.labels = vec!["rent".to_string()];
        manager.create_action(args, APP).await.unwrap();
        manager
            .encrypt(
                EncryptArgs {
                    key: KeyDerivation::new(Protocol::new(SecurityLevel::App, "todo list"), "1"),
                    plaintext: b"milk".to_vec(),
                },
                APP,
            )
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 0);
        let created = manager.wallet().created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].options.sign_and_process, None);
        assert_eq!(created[0].labels, vec!["rent", "admin originator app.example"]);
    }

    #[tokio::test]
    async fn pay_rent_with_metadata_encryption() {
        let config = PermissionsConfig {
            encrypt_wallet_metadata: true,
            ..spending_only()
        };
        let manager = PermissionsManager::new(MockWallet::with_fee(20), ADMIN, config);
        grant_spending(&manager, 1000);

        let result = manager.create_action(pay_rent(), APP).await.unwrap();
        assert_eq!(result.txid.as_deref(), Some("tx0"));
        assert_eq!(manager.wallet().signed(), vec!["ref0"]);

        let created = manager.wallet().created();
        assert_ne!(created[0].description, "pay rent");
        assert_eq!(created[0].options.sign_and_process, Some(false));
        assert_eq!(manager.tokens()[0].spending_limit, Some(1000 - 500 - 20));
        // One encryption each for the action and output descriptions.
        assert_eq!(manager.wallet().encrypt_count(), 2);

        let listed = manager
            .list_actions(ListActionsArgs::default(), APP)
            .await
            .unwrap();
        assert_eq!(listed.actions[0].description, "pay rent");
        assert_eq!(listed.actions[0].outputs[0].output_description, "rent");
        assert_eq!(manager.wallet().decrypt_count(), 2);

        let keys = manager.wallet().cipher_keys();
        assert_eq!(keys.len(), 4);
        for (key, originator) in keys {
            assert_eq!(key.protocol_id, metadata_protocol());
            assert_eq!(key.protocol_id.security_level, SecurityLevel::Counterparty);
            assert_eq!(key.protocol_id.name, "admin metadata encryption");
            assert_eq!(key.key_id, METADATA_KEY_ID);
            assert_eq!(key.counterparty, Some(Counterparty::Myself));
            assert_eq!(originator, ADMIN);
        }
    }

    #[tokio::test]
    async fn pay_rent_without_metadata_encryption() {
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, spending_only());
        grant_spending(&manager, 1000);

        manager.create_action(pay_rent(), APP).await.unwrap();
        let listed = manager
            .list_actions(ListActionsArgs::default(), APP)
            .await
            .unwrap();

        assert_eq!(manager.wallet().created()[0].description, "pay rent");
        assert_eq!(listed.actions[0].description, "pay rent");
        assert_eq!(listed.actions[0].outputs[0].output_description, "rent");
        assert_eq!(manager.wallet().encrypt_count(), 0);
    }

    #[tokio::test]
    async fn records_encrypted_earlier_stay_readable() {
        let manager =
            PermissionsManager::new(MockWallet::new(), ADMIN, PermissionsConfig::permissive());
        let stored = manager.cipher().encrypt_field("pay rent").await.unwrap();
        let mut args = pay_rent();
        args.description = stored.clone();
        manager.create_action(args, ADMIN).await.unwrap();

        let listed = manager
            .list_actions(ListActionsArgs::default(), APP)
            .await
            .unwrap();

        assert_eq!(manager.wallet().created()[0].description, stored);
        assert_eq!(listed.actions[0].description, "pay rent");
    }

    #[tokio::test]
    async fn failed_sign_aborts_and_refunds_budget() {
        let manager = PermissionsManager::new(MockWallet::failing_sign(), ADMIN, spending_only());
        let seen = counting_requests(&manager);
        manager.seed_token(PermissionToken::spending(APP, 1000));

        let err = manager.create_action(pay_rent(), APP).await.unwrap_err();

        assert!(matches!(err, Error::Wallet(wallet::Error::Internal(_))));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(manager.wallet().signed(), vec!["ref0"]);
        assert_eq!(manager.wallet().aborted(), vec!["ref0"]);
        assert_eq!(manager.tokens()[0].spending_limit, Some(1000));
    }

    #[tokio::test]
    async fn denied_spending_aborts_staged_action() {
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, spending_only());
        let seen = counting_requests(&manager);

        let err = manager.create_action(pay_rent(), APP).await.unwrap_err();

        assert!(matches!(
            err,
            Error::PermissionDenied {
                category: PermissionCategory::SpendingAuthorization,
                ..
            }
        ));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(manager.wallet().aborted(), vec!["ref0"]);
        assert!(manager.wallet().signed().is_empty());
    }

    #[tokio::test]
    async fn exceeding_budget_fails_without_prompt() {
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, spending_only());
        let seen = counting_requests(&manager);
        manager.seed_token(PermissionToken::spending(APP, 300));

        let err = manager.create_action(pay_rent(), APP).await.unwrap_err();

        assert!(matches!(
            err,
            Error::InsufficientSpendingLimit {
                requested: 500,
                available: 300
            }
        ));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(manager.tokens()[0].spending_limit, Some(300));
        assert_eq!(manager.wallet().aborted(), vec!["ref0"]);
    }

    #[tokio::test]
    async fn self_funded_action_needs_no_spending_grant() {
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, spending_only());
        let seen = counting_requests(&manager);

        let mut args = pay_rent();
        args.inputs = vec![CreateActionInput {
            outpoint: "aa.0".to_string(),
            input_description: "own coin".to_string(),
            source_satoshis: Some(600),
            ..Default::default()
        }];
        manager.create_action(args, APP).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(manager.wallet().signed(), vec!["ref0"]);
    }

    #[tokio::test]
    async fn unsigned_result_returned_when_caller_opts_out() {
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, spending_only());
        grant_spending(&manager, 1000);

        let mut args = pay_rent();
        args.options = CreateActionOptions {
            sign_and_process: Some(false),
            ..Default::default()
        };
        let result = manager.create_action(args, APP).await.unwrap();

        assert_eq!(result.signable_transaction.unwrap().reference, "ref0");
        assert!(manager.wallet().signed().is_empty());
    }

    #[tokio::test]
    async fn signing_request_denied_from_another_task() {
        let manager = Arc::new(PermissionsManager::new(
            MockWallet::new(),
            ADMIN,
            PermissionsConfig::default(),
        ));
        let args = CreateSignatureArgs {
            key: KeyDerivation::new(Protocol::new(SecurityLevel::Counterparty, "todo list"), "1")
                .with_counterparty(Counterparty::from("02bob")),
            data: Some(b"hello".to_vec()),
            hash_to_directly_sign: None,
        };

        let waiter = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.create_signature(args, APP).await })
        };
        let request = loop {
            if let Some(request) = manager.pending_requests().pop() {
                break request;
            }
            tokio::task::yield_now().await;
        };
        assert_eq!(request.category, PermissionCategory::ProtocolUsage);
        assert_eq!(request.originator, APP);
        manager.deny_permission(request.id, None).unwrap();

        assert!(matches!(
            waiter.await.unwrap(),
            Err(Error::PermissionDenied { .. })
        ));
        assert!(!manager.wallet().was_called("create_signature"));
    }

    #[tokio::test]
    async fn reserved_basket_is_refused() {
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, PermissionsConfig::permissive());

        let mut args = pay_rent();
        args.outputs[0].basket = Some("admin vault".to_string());
        let err = manager.create_action(args, APP).await.unwrap_err();

        assert!(matches!(err, Error::PermissionDenied { .. }));
        assert!(manager.wallet().calls().is_empty());
    }

    #[tokio::test]
    async fn opting_out_of_prompts_denies_immediately() {
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, PermissionsConfig::default());
        let seen = counting_requests(&manager);
        let mut key = KeyDerivation::new(Protocol::new(SecurityLevel::App, "todo list"), "1");
        key.seek_permission = Some(false);

        let err = manager
            .encrypt(
                EncryptArgs {
                    key,
                    plaintext: b"milk".to_vec(),
                },
                APP,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PermissionDenied { .. }));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(manager.wallet().encrypt_count(), 0);
    }

    #[tokio::test]
    async fn listed_outputs_are_decrypted() {
        let config = PermissionsConfig {
            encrypt_wallet_metadata: true,
            ..PermissionsConfig::permissive()
        };
        let manager = PermissionsManager::new(MockWallet::new(), ADMIN, config);

        let mut args = pay_rent();
        args.outputs[0].basket = Some("todo tokens".to_string());
        args.outputs[0].custom_instructions = Some("derive with 7".to_string());
        manager.create_action(args, APP).await.unwrap();

        let listed = manager
            .list_outputs(
                ListOutputsArgs {
                    basket: "todo tokens".to_string(),
                    ..Default::default()
                },
                APP,
            )
            .await
            .unwrap();
        assert_eq!(
            listed.outputs[0].custom_instructions.as_deref(),
            Some("derive with 7")
        );
        assert!(manager.wallet().calls().iter().any(|call| matches!(
            call,
            Call::Decrypt { originator, .. } if originator == ADMIN
        )));
    }

    #[test]
    fn net_spend_floors_at_zero() {
        let mut args = pay_rent();
        args.inputs = vec![CreateActionInput {
            source_satoshis: Some(2000),
            ..Default::default()
        }];
        let (amount, items) = net_spend(&args, 10);
        assert_eq!(amount, 0);
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].kind, LineItemKind::Fee);
    }
}
