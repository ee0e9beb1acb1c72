//! Per-originator permission enforcement for a wallet.
//!
//! This crate wraps any [`wallet::WalletInterface`] in a [`PermissionsManager`]
//! that exposes the same interface. Every call names its originator, the
//! application making it. The admin originator goes straight through; every
//! other caller must hold a permission token for what it touches, or wait
//! while a request for one is put to the user.
//!
//! # Core Concepts
//!
//! ## Tokens
//!
//! A [`PermissionToken`] is a stored grant: one originator, one
//! [`ResourceKey`], an optional expiry and, for spending, a remaining
//! satoshi budget. Tokens live in a [`TokenStore`]; expired tokens are
//! evicted when looked up.
//!
//! ## Requests
//!
//! When no token applies, the call is suspended on a [`PermissionRequest`].
//! Handlers bound with [`PermissionsManager::bind_callback`] are notified,
//! and the request resolves when something calls
//! [`PermissionsManager::grant_permission`] or
//! [`PermissionsManager::deny_permission`] (or the same methods on a
//! [`PermissionResponder`]), or when its timeout elapses.
//!
//! ## Configuration
//!
//! [`PermissionsConfig`] toggles each class of check and the encryption of
//! action metadata. Everything is enforced by default.
//!
//! # Example
//!
//! ```no_run
//! use permissions::{GrantAmendments, PermissionCategory, PermissionsConfig, PermissionsManager};
//! # async fn run<W: wallet::WalletInterface<Error = wallet::Error>>(wallet: W) -> permissions::Result<()> {
//! let manager = PermissionsManager::new(wallet, "wallet.local", PermissionsConfig::default());
//!
//! let responder = manager.responder();
//! manager.bind_callback(PermissionCategory::SpendingAuthorization, move |request| {
//!     // Ask the user, then:
//!     responder.grant(request.id, GrantAmendments::default())?;
//!     Ok(())
//! });
//! # Ok(())
//! # }
//! ```

mod callbacks;
mod config;
mod error;
mod evaluator;
mod manager;
mod metadata;
mod proxy;
mod registry;
mod request;
mod responder;
mod store;
mod token;

#[cfg(test)]
mod mock;

pub use callbacks::{CallbackDispatcher, CallbackError, CallbackId, PermissionCallback};
pub use config::{PermissionsConfig, Seek};
pub use error::{Error, Result};
pub use evaluator::{Decision, Evaluator};
pub use manager::PermissionsManager;
pub use metadata::{METADATA_KEY_ID, METADATA_PROTOCOL_NAME, MetadataCipher, metadata_protocol};
pub use registry::{RequestHandle, RequestRegistry, Resolution};
pub use request::{
    GrantAmendments, LineItem, LineItemKind, PermissionRequest, RequestId, RequestStatus,
    ResourceDescriptor,
};
pub use responder::PermissionResponder;
pub use store::{InsufficientLimit, SpendOutcome, TokenStore};
pub use token::{PermissionCategory, PermissionToken, ResourceKey, TokenId};
