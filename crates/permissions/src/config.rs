//! Permissions manager configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Process-wide policy switches, fixed at construction.
///
/// Every enforcement flag defaults to `true`. Setting one to `false` opts the
/// whole check class out: calls of that kind never raise a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    pub seek_protocol_permissions_for_signing: bool,
    pub seek_protocol_permissions_for_encrypting: bool,
    pub seek_protocol_permissions_for_hmac: bool,
    pub seek_permissions_for_key_linkage_revelation: bool,
    pub seek_permissions_for_public_key_revelation: bool,
    pub seek_permissions_for_identity_key_revelation: bool,
    pub seek_permissions_for_identity_resolution: bool,
    pub seek_basket_insertion_permissions: bool,
    pub seek_basket_removal_permissions: bool,
    pub seek_basket_listing_permissions: bool,
    pub seek_permission_when_applying_action_labels: bool,
    pub seek_permission_when_listing_actions_by_label: bool,
    pub seek_certificate_disclosure_permissions: bool,
    pub seek_certificate_acquisition_permissions: bool,
    pub seek_certificate_relinquishment_permissions: bool,
    pub seek_certificate_listing_permissions: bool,
    pub seek_spending_authorization: bool,

    /// Encrypt descriptions and custom instructions before they reach the wallet.
    pub encrypt_wallet_metadata: bool,

    /// Keep grants for privileged key operations separate from normal ones.
    pub differentiate_privileged_operations: bool,

    /// How long a raised request may stay pending. Unset means forever.
    pub request_timeout_secs: Option<u64>,
}

/// Names one enforcement flag of [`PermissionsConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seek {
    Signing,
    Encrypting,
    Hmac,
    KeyLinkageRevelation,
    PublicKeyRevelation,
    IdentityKeyRevelation,
    IdentityResolution,
    BasketInsertion,
    BasketRemoval,
    BasketListing,
    ApplyingActionLabels,
    ListingActionsByLabel,
    CertificateDisclosure,
    CertificateAcquisition,
    CertificateRelinquishment,
    CertificateListing,
    Spending,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            seek_protocol_permissions_for_signing: true,
            seek_protocol_permissions_for_encrypting: true,
            seek_protocol_permissions_for_hmac: true,
            seek_permissions_for_key_linkage_revelation: true,
            seek_permissions_for_public_key_revelation: true,
            seek_permissions_for_identity_key_revelation: true,
            seek_permissions_for_identity_resolution: true,
            seek_basket_insertion_permissions: true,
            seek_basket_removal_permissions: true,
            seek_basket_listing_permissions: true,
            seek_permission_when_applying_action_labels: true,
            seek_permission_when_listing_actions_by_label: true,
            seek_certificate_disclosure_permissions: true,
            seek_certificate_acquisition_permissions: true,
            seek_certificate_relinquishment_permissions: true,
            seek_certificate_listing_permissions: true,
            seek_spending_authorization: true,
            encrypt_wallet_metadata: true,
            differentiate_privileged_operations: true,
            request_timeout_secs: None,
        }
    }
}

impl PermissionsConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string. Missing keys take their defaults.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }

    /// A configuration that enforces nothing; useful for trusted embedders and tests.
    pub fn permissive() -> Self {
        Self {
            seek_protocol_permissions_for_signing: false,
            seek_protocol_permissions_for_encrypting: false,
            seek_protocol_permissions_for_hmac: false,
            seek_permissions_for_key_linkage_revelation: false,
            seek_permissions_for_public_key_revelation: false,
            seek_permissions_for_identity_key_revelation: false,
            seek_permissions_for_identity_resolution: false,
            seek_basket_insertion_permissions: false,
            seek_basket_removal_permissions: false,
            seek_basket_listing_permissions: false,
            seek_permission_when_applying_action_labels: false,
            seek_permission_when_listing_actions_by_label: false,
            seek_certificate_disclosure_permissions: false,
            seek_certificate_acquisition_permissions: false,
            seek_certificate_relinquishment_permissions: false,
            seek_certificate_listing_permissions: false,
            seek_spending_authorization: false,
            encrypt_wallet_metadata: false,
            differentiate_privileged_operations: false,
            request_timeout_secs: None,
        }
    }

    /// Whether the given check class is enforced.
    pub fn seeks(&self, seek: Seek) -> bool {
        match seek {
            Seek::Signing => self.seek_protocol_permissions_for_signing,
            Seek::Encrypting => self.seek_protocol_permissions_for_encrypting,
            Seek::Hmac => self.seek_protocol_permissions_for_hmac,
            Seek::KeyLinkageRevelation => self.seek_permissions_for_key_linkage_revelation,
            Seek::PublicKeyRevelation => self.seek_permissions_for_public_key_revelation,
            Seek::IdentityKeyRevelation => self.seek_permissions_for_identity_key_revelation,
            Seek::IdentityResolution => self.seek_permissions_for_identity_resolution,
            Seek::BasketInsertion => self.seek_basket_insertion_permissions,
            Seek::BasketRemoval => self.seek_basket_removal_permissions,
            Seek::BasketListing => self.seek_basket_listing_permissions,
            Seek::ApplyingActionLabels => self.seek_permission_when_applying_action_labels,
            Seek::ListingActionsByLabel => self.seek_permission_when_listing_actions_by_label,
            Seek::CertificateDisclosure => self.seek_certificate_disclosure_permissions,
            Seek::CertificateAcquisition => self.seek_certificate_acquisition_permissions,
            Seek::CertificateRelinquishment => self.seek_certificate_relinquishment_permissions,
            Seek::CertificateListing => self.seek_certificate_listing_permissions,
            Seek::Spending => self.seek_spending_authorization,
        }
    }

    /// The pending-request bound, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
