//! Key-derivation based cryptographic primitives.

use crate::{Counterparty, Protocol};
use serde::{Deserialize, Serialize};

/// Which derived key a cryptographic call operates with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDerivation {
    #[serde(rename = "protocolID")]
    pub protocol_id: Protocol,
    #[serde(rename = "keyID")]
    pub key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<Counterparty>,
    #[serde(default)]
    pub privileged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged_reason: Option<String>,
    /// When `false`, fail instead of prompting for a missing permission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seek_permission: Option<bool>,
}

impl KeyDerivation {
    pub fn new(protocol_id: Protocol, key_id: impl Into<String>) -> Self {
        Self {
            protocol_id,
            key_id: key_id.into(),
            counterparty: None,
            privileged: false,
            privileged_reason: None,
            seek_permission: None,
        }
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<Counterparty>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }

    pub fn privileged(mut self, reason: impl Into<String>) -> Self {
        self.privileged = true;
        self.privileged_reason = Some(reason.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPublicKeyArgs {
    /// Return the wallet's root identity key instead of a derived key.
    #[serde(default)]
    pub identity_key: bool,
    /// Required unless `identity_key` is set.
    #[serde(flatten)]
    pub key: Option<KeyDerivation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_self: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPublicKeyResult {
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptArgs {
    #[serde(flatten)]
    pub key: KeyDerivation,
    pub plaintext: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptResult {
    pub ciphertext: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptArgs {
    #[serde(flatten)]
    pub key: KeyDerivation,
    pub ciphertext: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptResult {
    pub plaintext: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHmacArgs {
    #[serde(flatten)]
    pub key: KeyDerivation,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHmacResult {
    pub hmac: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyHmacArgs {
    #[serde(flatten)]
    pub key: KeyDerivation,
    pub data: Vec<u8>,
    pub hmac: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyHmacResult {
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSignatureArgs {
    #[serde(flatten)]
    pub key: KeyDerivation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_to_directly_sign: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSignatureResult {
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySignatureArgs {
    #[serde(flatten)]
    pub key: KeyDerivation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_to_directly_verify: Option<Vec<u8>>,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySignatureResult {
    pub valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealCounterpartyKeyLinkageArgs {
    pub counterparty: String,
    pub verifier: String,
    #[serde(default)]
    pub privileged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealSpecificKeyLinkageArgs {
    #[serde(flatten)]
    pub key: KeyDerivation,
    pub verifier: String,
}

/// Linkage material encrypted for a verifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyLinkageResult {
    pub prover: String,
    pub verifier: String,
    pub counterparty: String,
    pub encrypted_linkage: Vec<u8>,
    pub encrypted_linkage_proof: Vec<u8>,
}
