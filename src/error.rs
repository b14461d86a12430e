//! Closed error taxonomy returned by the two workflows.
//!
//! Every collaborator failure is wrapped into one of these kinds. The wrapped
//! source is kept for diagnostics and never carries key or plaintext
//! material.

use crate::cipher::CipherError;
use crate::link::LinkFormatError;
use crate::secret::EntropySourceUnavailable;
use crate::store::StoreError;
use thiserror::Error;

/// Why a secret could not be turned into a link.
#[derive(Error, Debug)]
pub enum CreationError {
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(#[source] EntropySourceUnavailable),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(#[source] CipherError),

    #[error("Publishing the encrypted message failed: {0}")]
    PublishFailed(#[source] StoreError),
}

/// Why a link could not be turned back into a message.
#[derive(Error, Debug)]
pub enum RedemptionError {
    #[error("Invalid link: {0}")]
    InvalidLink(#[from] LinkFormatError),

    /// Never existed or already read. The two cases are deliberately not
    /// distinguished.
    #[error("Message is unavailable")]
    UnavailableOrConsumed,

    #[error("Fetching the message failed: {0}")]
    FetchFailed(#[source] StoreError),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(#[source] CipherError),
}

impl From<StoreError> for RedemptionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::UnavailableOrConsumed,
            other => Self::FetchFailed(other),
        }
    }
}

/// Result type alias for message creation
pub type CreationResult<T> = Result<T, CreationError>;

/// Result type alias for message redemption
pub type RedemptionResult<T> = Result<T, RedemptionError>;
