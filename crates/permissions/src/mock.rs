//! Recording in-memory wallet for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use wallet::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateAction {
        args: CreateActionArgs,
        originator: String,
    },
    SignAction {
        reference: String,
    },
    AbortAction {
        reference: String,
    },
    Encrypt {
        key: KeyDerivation,
        originator: String,
    },
    Decrypt {
        key: KeyDerivation,
        originator: String,
    },
    Method {
        name: &'static str,
        originator: String,
    },
}

/// Wallet double that records every call and keeps created actions.
///
/// Its "ciphertext" is the plaintext xor-masked behind a header naming the
/// protocol and key id, so decrypting with any other key, or decrypting
/// bytes that were never encrypted, fails.
#[derive(Default)]
pub struct MockWallet {
    calls: Mutex<Vec<Call>>,
    actions: Mutex<Vec<WalletAction>>,
    outputs: Mutex<Vec<WalletOutput>>,
    next_reference: AtomicU64,
    fee: u64,
    fail_sign: bool,
}

impl MockWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fee(fee: u64) -> Self {
        Self {
            fee,
            ..Self::default()
        }
    }

    /// A wallet that stages actions but fails to sign them.
    pub fn failing_sign() -> Self {
        Self {
            fail_sign: true,
            ..Self::default()
        }
    }

    /// Every encrypt and decrypt key, in call order.
    pub fn cipher_keys(&self) -> Vec<(KeyDerivation, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Encrypt { key, originator } | Call::Decrypt { key, originator } => {
                    Some((key, originator))
                }
                _ => None,
            })
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn encrypt_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Encrypt { .. }))
            .count()
    }

    pub fn decrypt_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Decrypt { .. }))
            .count()
    }

    pub fn aborted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::AbortAction { reference } => Some(reference),
                _ => None,
            })
            .collect()
    }

    pub fn signed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SignAction { reference } => Some(reference),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> Vec<CreateActionArgs> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateAction { args, .. } => Some(args),
                _ => None,
            })
            .collect()
    }

    pub fn was_called(&self, name: &str) -> bool {
        self.calls()
            .iter()
            .any(|call| matches!(call, Call::Method { name: called, .. } if *called == name))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn method(&self, name: &'static str, originator: &str) {
        self.record(Call::Method {
            name,
            originator: originator.to_string(),
        });
    }
}

fn header(key: &KeyDerivation) -> Vec<u8> {
    format!("{}|{}|", key.protocol_id, key.key_id).into_bytes()
}

fn mask(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|b| b ^ 0x5a).collect()
}

impl WalletInterface for MockWallet {
    type Error = Error;

    async fn create_action(&self, args: CreateActionArgs, originator: &str) -> Result<CreateActionResult> {
        self.record(Call::CreateAction {
            args: args.clone(),
            originator: originator.to_string(),
        });

        let n = self.next_reference.fetch_add(1, Ordering::SeqCst);
        let staged = args.options.sign_and_process == Some(false);
        self.actions.lock().unwrap().push(WalletAction {
            txid: format!("tx{n}"),
            satoshis: -(args.outputs.iter().map(|o| o.satoshis as i64).sum::<i64>()),
            status: if staged {
                ActionStatus::Unsigned
            } else {
                ActionStatus::Completed
            },
            is_outgoing: true,
            description: args.description.clone(),
            labels: args.labels.clone(),
            version: 1,
            lock_time: 0,
            inputs: args
                .inputs
                .iter()
                .map(|input| WalletActionInput {
                    source_outpoint: input.outpoint.clone(),
                    source_satoshis: input.source_satoshis.unwrap_or(0),
                    input_description: input.input_description.clone(),
                    sequence_number: 0,
                })
                .collect(),
            outputs: args
                .outputs
                .iter()
                .enumerate()
                .map(|(i, output)| WalletActionOutput {
                    output_index: i as u32,
                    satoshis: output.satoshis,
                    spendable: true,
                    output_description: output.output_description.clone(),
                    basket: output.basket.clone(),
                    custom_instructions: output.custom_instructions.clone(),
                    ..Default::default()
                })
                .collect(),
        });
        for (i, output) in args.outputs.iter().enumerate() {
            if output.basket.is_some() {
                self.outputs.lock().unwrap().push(WalletOutput {
                    outpoint: format!("tx{n}.{i}"),
                    satoshis: output.satoshis,
                    spendable: true,
                    custom_instructions: output.custom_instructions.clone(),
                    tags: output.tags.clone(),
                    ..Default::default()
                });
            }
        }

        if staged {
            Ok(CreateActionResult {
                signable_transaction: Some(SignableTransaction {
                    tx: vec![n as u8],
                    reference: format!("ref{n}"),
                    fee: self.fee,
                }),
                ..Default::default()
            })
        } else {
            Ok(CreateActionResult {
                txid: Some(format!("tx{n}")),
                ..Default::default()
            })
        }
    }

    async fn sign_action(&self, args: SignActionArgs, _originator: &str) -> Result<SignActionResult> {
        let txid = args.reference.replacen("ref", "tx", 1);
        self.record(Call::SignAction {
            reference: args.reference,
        });
        if self.fail_sign {
            return Err(Error::Internal("broadcast failed".to_string()));
        }
        Ok(SignActionResult {
            txid: Some(txid),
            tx: None,
        })
    }

    async fn abort_action(&self, args: AbortActionArgs, _originator: &str) -> Result<AbortActionResult> {
        self.record(Call::AbortAction {
            reference: args.reference,
        });
        Ok(AbortActionResult { aborted: true })
    }

    async fn list_actions(&self, _args: ListActionsArgs, originator: &str) -> Result<ListActionsResult> {
        self.method("list_actions", originator);
        let actions = self.actions.lock().unwrap().clone();
        Ok(ListActionsResult {
            total_actions: actions.len() as u32,
            actions,
        })
    }

    async fn internalize_action(
        &self,
        _args: InternalizeActionArgs,
        originator: &str,
    ) -> Result<InternalizeActionResult> {
        self.method("internalize_action", originator);
        Ok(InternalizeActionResult { accepted: true })
    }

    async fn list_outputs(&self, _args: ListOutputsArgs, originator: &str) -> Result<ListOutputsResult> {
        self.method("list_outputs", originator);
        let outputs = self.outputs.lock().unwrap().clone();
        Ok(ListOutputsResult {
            total_outputs: outputs.len() as u32,
            outputs,
        })
    }

    async fn relinquish_output(
        &self,
        _args: RelinquishOutputArgs,
        originator: &str,
    ) -> Result<RelinquishOutputResult> {
        self.method("relinquish_output", originator);
        Ok(RelinquishOutputResult { relinquished: true })
    }

    async fn get_public_key(&self, _args: GetPublicKeyArgs, originator: &str) -> Result<GetPublicKeyResult> {
        self.method("get_public_key", originator);
        Ok(GetPublicKeyResult {
            public_key: "02mock".to_string(),
        })
    }

    async fn reveal_counterparty_key_linkage(
        &self,
        _args: RevealCounterpartyKeyLinkageArgs,
        originator: &str,
    ) -> Result<KeyLinkageResult> {
        self.method("reveal_counterparty_key_linkage", originator);
        Ok(KeyLinkageResult::default())
    }

    async fn reveal_specific_key_linkage(
        &self,
        _args: RevealSpecificKeyLinkageArgs,
        originator: &str,
    ) -> Result<KeyLinkageResult> {
        self.method("reveal_specific_key_linkage", originator);
        Ok(KeyLinkageResult::default())
    }

    async fn encrypt(&self, args: EncryptArgs, originator: &str) -> Result<EncryptResult> {
        let mut ciphertext = header(&args.key);
        ciphertext.extend(mask(&args.plaintext));
        self.record(Call::Encrypt {
            key: args.key,
            originator: originator.to_string(),
        });
        Ok(EncryptResult { ciphertext })
    }

    async fn decrypt(&self, args: DecryptArgs, originator: &str) -> Result<DecryptResult> {
        let header = header(&args.key);
        self.record(Call::Decrypt {
            key: args.key,
            originator: originator.to_string(),
        });
        let body = args
            .ciphertext
            .strip_prefix(header.as_slice())
            .ok_or_else(|| Error::Decryption("wrong key or not ciphertext".to_string()))?;
        Ok(DecryptResult {
            plaintext: mask(body),
        })
    }

    async fn create_hmac(&self, _args: CreateHmacArgs, originator: &str) -> Result<CreateHmacResult> {
        self.method("create_hmac", originator);
        Ok(CreateHmacResult { hmac: vec![0; 32] })
    }

    async fn verify_hmac(&self, _args: VerifyHmacArgs, originator: &str) -> Result<VerifyHmacResult> {
        self.method("verify_hmac", originator);
        Ok(VerifyHmacResult { valid: true })
    }

    async fn create_signature(
        &self,
        _args: CreateSignatureArgs,
        originator: &str,
    ) -> Result<CreateSignatureResult> {
        self.method("create_signature", originator);
        Ok(CreateSignatureResult {
            signature: vec![0x30],
        })
    }

    async fn verify_signature(
        &self,
        _args: VerifySignatureArgs,
        originator: &str,
    ) -> Result<VerifySignatureResult> {
        self.method("verify_signature", originator);
        Ok(VerifySignatureResult { valid: true })
    }

    async fn acquire_certificate(
        &self,
        args: AcquireCertificateArgs,
        originator: &str,
    ) -> Result<WalletCertificate> {
        self.method("acquire_certificate", originator);
        Ok(WalletCertificate {
            cert_type: args.cert_type,
            certifier: args.certifier,
            fields: args.fields,
            ..Default::default()
        })
    }

    async fn list_certificates(
        &self,
        _args: ListCertificatesArgs,
        originator: &str,
    ) -> Result<ListCertificatesResult> {
        self.method("list_certificates", originator);
        Ok(ListCertificatesResult::default())
    }

    async fn prove_certificate(
        &self,
        _args: ProveCertificateArgs,
        originator: &str,
    ) -> Result<ProveCertificateResult> {
        self.method("prove_certificate", originator);
        Ok(ProveCertificateResult::default())
    }

    async fn relinquish_certificate(
        &self,
        _args: RelinquishCertificateArgs,
        originator: &str,
    ) -> Result<RelinquishCertificateResult> {
        self.method("relinquish_certificate", originator);
        Ok(RelinquishCertificateResult { relinquished: true })
    }

    async fn discover_by_identity_key(
        &self,
        _args: DiscoverByIdentityKeyArgs,
        originator: &str,
    ) -> Result<DiscoverCertificatesResult> {
        self.method("discover_by_identity_key", originator);
        Ok(DiscoverCertificatesResult::default())
    }

    async fn discover_by_attributes(
        &self,
        _args: DiscoverByAttributesArgs,
        originator: &str,
    ) -> Result<DiscoverCertificatesResult> {
        self.method("discover_by_attributes", originator);
        Ok(DiscoverCertificatesResult::default())
    }

    async fn is_authenticated(&self, originator: &str) -> Result<AuthenticatedResult> {
        self.method("is_authenticated", originator);
        Ok(AuthenticatedResult {
            authenticated: true,
        })
    }

    async fn wait_for_authentication(&self, originator: &str) -> Result<AuthenticatedResult> {
        self.method("wait_for_authentication", originator);
        Ok(AuthenticatedResult {
            authenticated: true,
        })
    }

    async fn get_height(&self, originator: &str) -> Result<GetHeightResult> {
        self.method("get_height", originator);
        Ok(GetHeightResult { height: 800_000 })
    }

    async fn get_header_for_height(&self, _args: GetHeaderArgs, originator: &str) -> Result<GetHeaderResult> {
        self.method("get_header_for_height", originator);
        Ok(GetHeaderResult::default())
    }

    async fn get_network(&self, originator: &str) -> Result<GetNetworkResult> {
        self.method("get_network", originator);
        Ok(GetNetworkResult::default())
    }

    async fn get_version(&self, originator: &str) -> Result<GetVersionResult> {
        self.method("get_version", originator);
        Ok(GetVersionResult {
            version: "mock-0.1".to_string(),
        })
    }
}
