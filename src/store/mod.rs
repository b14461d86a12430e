//! Remote storage of encrypted payloads.
//!
//! The store only ever sees ciphertext keyed by identifier. `redeem` is a
//! read-once operation: it returns the payload and invalidates the record in
//! one atomic step, so a given identifier yields its payload at most once.

pub mod http;
pub mod memory;

use crate::secret::{EncryptedPayload, MessageId};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use http::HttpRemoteStore;
pub use memory::InMemoryRemoteStore;

/// Remote store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record for this identifier: it never existed or was already redeemed.
    #[error("No such message")]
    NotFound,

    #[error("A message with this identifier already exists")]
    Conflict,

    #[error("Store rejected the request with status {status}")]
    Rejected { status: u16 },

    #[error("Store request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store transport error: {0}")]
    Transport(String),

    #[error("Store returned an unreadable response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors can embed the request URL; keep only the kind.
        let e = e.without_url();
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persists ciphertext by identifier and hands it out at most once.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Store `payload` under `id`.
    async fn create(&self, id: &MessageId, payload: &EncryptedPayload) -> StoreResult<()>;

    /// Fetch the payload for `id` and invalidate the record.
    ///
    /// Returns [`StoreError::NotFound`] both for identifiers that never existed
    /// and for ones already redeemed.
    async fn redeem(&self, id: &MessageId) -> StoreResult<EncryptedPayload>;
}
