//! Permission error types.

use crate::{PermissionCategory, RequestId, ResourceDescriptor};
use thiserror::Error;

/// Permissions manager errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request was denied, expired, or named a resource the originator
    /// may never use.
    #[error("permission denied for {category}: {resource}{}", reason_suffix(.reason))]
    PermissionDenied {
        category: PermissionCategory,
        resource: String,
        reason: Option<String>,
    },

    /// The originator's spending budget does not cover the requested amount.
    #[error("insufficient spending limit: requested {requested} satoshis, {available} available")]
    InsufficientSpendingLimit { requested: u64, available: u64 },

    /// `grant`/`deny` named a request that is unknown or already resolved.
    #[error("unknown or already resolved permission request: {0}")]
    InvalidRequestId(RequestId),

    /// The underlying wallet answered in a shape the manager cannot use.
    #[error("invalid wallet response: {0}")]
    InvalidWalletResponse(String),

    /// Failed to parse a configuration file.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// An I/O error occurred while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying wallet failed; passed through unchanged.
    #[error(transparent)]
    Wallet(#[from] wallet::Error),
}

impl Error {
    pub(crate) fn denied(descriptor: &ResourceDescriptor, reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            category: descriptor.category(),
            resource: descriptor.to_string(),
            reason: Some(reason.into()),
        }
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
