//! Capability-neutral wallet interface.
//!
//! This crate defines the method surface shared by a signing wallet and any
//! layer that wraps one. Every call carries the originator, the identity of
//! the application making the request, so a wrapping layer can decide per
//! call whether the request may proceed.
//!
//! # Core Concepts
//!
//! ## WalletInterface
//!
//! [`WalletInterface`] is the trait every wallet implements. Its methods are
//! grouped as:
//! - Actions: `create_action`, `sign_action`, `abort_action`,
//!   `list_actions`, `internalize_action`
//! - Outputs: `list_outputs`, `relinquish_output`
//! - Keys and cryptography: `get_public_key`, key linkage revelation,
//!   `encrypt`/`decrypt`, HMAC and signature primitives
//! - Certificates: acquire, list, prove, relinquish, and identity discovery
//! - Chain and session info: authentication, height, headers, network, version
//!
//! ## Protocols
//!
//! Derived keys are named by a [`Protocol`] (a [`SecurityLevel`] plus a
//! name), a key id, and a [`Counterparty`].
//!
//! # Re-exports
//!
//! All argument and result types are re-exported at the crate root.

mod action;
mod certificate;
mod chain;
mod crypto;
mod error;
mod interface;
mod output;
mod protocol;

pub use action::{
    AbortActionArgs, AbortActionResult, ActionStatus, BasketInsertionRemittance,
    CreateActionArgs, CreateActionInput, CreateActionOptions, CreateActionOutput,
    CreateActionResult, InternalizeActionArgs, InternalizeActionResult, InternalizeOutput,
    InternalizeProtocol, ListActionsArgs, ListActionsResult, PaymentRemittance, QueryMode,
    SignActionArgs, SignActionOptions, SignActionResult, SignActionSpend, SignableTransaction,
    WalletAction, WalletActionInput, WalletActionOutput,
};
pub use certificate::{
    AcquireCertificateArgs, AcquisitionProtocol, DiscoverByAttributesArgs,
    DiscoverByIdentityKeyArgs, DiscoverCertificatesResult, IdentityCertificate,
    ListCertificatesArgs, ListCertificatesResult, ProveCertificateArgs, ProveCertificateResult,
    RelinquishCertificateArgs, RelinquishCertificateResult, WalletCertificate,
};
pub use chain::{
    AuthenticatedResult, GetHeaderArgs, GetHeaderResult, GetHeightResult, GetNetworkResult,
    GetVersionResult, Network,
};
pub use crypto::{
    CreateHmacArgs, CreateHmacResult, CreateSignatureArgs, CreateSignatureResult, DecryptArgs,
    DecryptResult, EncryptArgs, EncryptResult, GetPublicKeyArgs, GetPublicKeyResult,
    KeyDerivation, KeyLinkageResult, RevealCounterpartyKeyLinkageArgs,
    RevealSpecificKeyLinkageArgs, VerifyHmacArgs, VerifyHmacResult, VerifySignatureArgs,
    VerifySignatureResult,
};
pub use error::{Error, Result};
pub use interface::WalletInterface;
pub use output::{
    ListOutputsArgs, ListOutputsResult, RelinquishOutputArgs, RelinquishOutputResult,
    WalletOutput,
};
pub use protocol::{Counterparty, Protocol, SecurityLevel};
