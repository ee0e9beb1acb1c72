//! The wallet method surface.

use crate::{
    AbortActionArgs, AbortActionResult, AcquireCertificateArgs, AuthenticatedResult,
    CreateActionArgs, CreateActionResult, CreateHmacArgs, CreateHmacResult, CreateSignatureArgs,
    CreateSignatureResult, DecryptArgs, DecryptResult, DiscoverByAttributesArgs,
    DiscoverByIdentityKeyArgs, DiscoverCertificatesResult, EncryptArgs, EncryptResult,
    GetHeaderArgs, GetHeaderResult, GetHeightResult, GetNetworkResult, GetPublicKeyArgs,
    GetPublicKeyResult, GetVersionResult, InternalizeActionArgs, InternalizeActionResult,
    KeyLinkageResult, ListActionsArgs, ListActionsResult, ListCertificatesArgs,
    ListCertificatesResult, ListOutputsArgs, ListOutputsResult, ProveCertificateArgs,
    ProveCertificateResult, RelinquishCertificateArgs, RelinquishCertificateResult,
    RelinquishOutputArgs, RelinquishOutputResult, RevealCounterpartyKeyLinkageArgs,
    RevealSpecificKeyLinkageArgs, SignActionArgs, SignActionResult, VerifyHmacArgs,
    VerifyHmacResult, VerifySignatureArgs, VerifySignatureResult, WalletCertificate,
};
use std::future::Future;

/// A wallet's capability-neutral method surface.
///
/// Every method receives the originator (the calling application's identity)
/// alongside its arguments. Implementations may be a signing wallet or a
/// layer wrapping one; callers cannot tell the difference.
pub trait WalletInterface: Send + Sync {
    /// Error type returned by every method.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a new action, optionally staging it unsigned.
    fn create_action(
        &self,
        args: CreateActionArgs,
        originator: &str,
    ) -> impl Future<Output = Result<CreateActionResult, Self::Error>> + Send;

    /// Sign a previously staged action.
    fn sign_action(
        &self,
        args: SignActionArgs,
        originator: &str,
    ) -> impl Future<Output = Result<SignActionResult, Self::Error>> + Send;

    /// Abandon a staged action, releasing its inputs.
    fn abort_action(
        &self,
        args: AbortActionArgs,
        originator: &str,
    ) -> impl Future<Output = Result<AbortActionResult, Self::Error>> + Send;

    /// List actions matching the given labels.
    fn list_actions(
        &self,
        args: ListActionsArgs,
        originator: &str,
    ) -> impl Future<Output = Result<ListActionsResult, Self::Error>> + Send;

    /// Accept an incoming transaction's outputs into the wallet.
    fn internalize_action(
        &self,
        args: InternalizeActionArgs,
        originator: &str,
    ) -> impl Future<Output = Result<InternalizeActionResult, Self::Error>> + Send;

    /// List spendable outputs in a basket.
    fn list_outputs(
        &self,
        args: ListOutputsArgs,
        originator: &str,
    ) -> impl Future<Output = Result<ListOutputsResult, Self::Error>> + Send;

    /// Stop tracking an output in a basket.
    fn relinquish_output(
        &self,
        args: RelinquishOutputArgs,
        originator: &str,
    ) -> impl Future<Output = Result<RelinquishOutputResult, Self::Error>> + Send;

    fn get_public_key(
        &self,
        args: GetPublicKeyArgs,
        originator: &str,
    ) -> impl Future<Output = Result<GetPublicKeyResult, Self::Error>> + Send;

    /// Reveal all key linkage with a counterparty to a verifier.
    fn reveal_counterparty_key_linkage(
        &self,
        args: RevealCounterpartyKeyLinkageArgs,
        originator: &str,
    ) -> impl Future<Output = Result<KeyLinkageResult, Self::Error>> + Send;

    /// Reveal the linkage of one derived key to a verifier.
    fn reveal_specific_key_linkage(
        &self,
        args: RevealSpecificKeyLinkageArgs,
        originator: &str,
    ) -> impl Future<Output = Result<KeyLinkageResult, Self::Error>> + Send;

    fn encrypt(
        &self,
        args: EncryptArgs,
        originator: &str,
    ) -> impl Future<Output = Result<EncryptResult, Self::Error>> + Send;

    fn decrypt(
        &self,
        args: DecryptArgs,
        originator: &str,
    ) -> impl Future<Output = Result<DecryptResult, Self::Error>> + Send;

    fn create_hmac(
        &self,
        args: CreateHmacArgs,
        originator: &str,
    ) -> impl Future<Output = Result<CreateHmacResult, Self::Error>> + Send;

    fn verify_hmac(
        &self,
        args: VerifyHmacArgs,
        originator: &str,
    ) -> impl Future<Output = Result<VerifyHmacResult, Self::Error>> + Send;

    fn create_signature(
        &self,
        args: CreateSignatureArgs,
        originator: &str,
    ) -> impl Future<Output = Result<CreateSignatureResult, Self::Error>> + Send;

    fn verify_signature(
        &self,
        args: VerifySignatureArgs,
        originator: &str,
    ) -> impl Future<Output = Result<VerifySignatureResult, Self::Error>> + Send;

    fn acquire_certificate(
        &self,
        args: AcquireCertificateArgs,
        originator: &str,
    ) -> impl Future<Output = Result<WalletCertificate, Self::Error>> + Send;

    fn list_certificates(
        &self,
        args: ListCertificatesArgs,
        originator: &str,
    ) -> impl Future<Output = Result<ListCertificatesResult, Self::Error>> + Send;

    /// Reveal selected certificate fields to a verifier.
    fn prove_certificate(
        &self,
        args: ProveCertificateArgs,
        originator: &str,
    ) -> impl Future<Output = Result<ProveCertificateResult, Self::Error>> + Send;

    fn relinquish_certificate(
        &self,
        args: RelinquishCertificateArgs,
        originator: &str,
    ) -> impl Future<Output = Result<RelinquishCertificateResult, Self::Error>> + Send;

    fn discover_by_identity_key(
        &self,
        args: DiscoverByIdentityKeyArgs,
        originator: &str,
    ) -> impl Future<Output = Result<DiscoverCertificatesResult, Self::Error>> + Send;

    fn discover_by_attributes(
        &self,
        args: DiscoverByAttributesArgs,
        originator: &str,
    ) -> impl Future<Output = Result<DiscoverCertificatesResult, Self::Error>> + Send;

    fn is_authenticated(
        &self,
        originator: &str,
    ) -> impl Future<Output = Result<AuthenticatedResult, Self::Error>> + Send;

    /// Resolve once the wallet user has authenticated.
    fn wait_for_authentication(
        &self,
        originator: &str,
    ) -> impl Future<Output = Result<AuthenticatedResult, Self::Error>> + Send;

    fn get_height(
        &self,
        originator: &str,
    ) -> impl Future<Output = Result<GetHeightResult, Self::Error>> + Send;

    fn get_header_for_height(
        &self,
        args: GetHeaderArgs,
        originator: &str,
    ) -> impl Future<Output = Result<GetHeaderResult, Self::Error>> + Send;

    fn get_network(
        &self,
        originator: &str,
    ) -> impl Future<Output = Result<GetNetworkResult, Self::Error>> + Send;

    fn get_version(
        &self,
        originator: &str,
    ) -> impl Future<Output = Result<GetVersionResult, Self::Error>> + Send;
}
