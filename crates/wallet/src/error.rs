//! Wallet error types.

use thiserror::Error;

/// Errors reported by a wallet implementation.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The call arguments were rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced action, output, or certificate does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Ciphertext could not be decrypted with the derived key.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The wallet refused the call for this originator.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other failure inside the wallet.
    #[error("internal wallet error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
