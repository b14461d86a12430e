//! The two user-facing operations.
//!
//! - [`SecretCreationWorkflow`]: generate id and key, encrypt, publish, encode link
//! - [`SecretRedemptionWorkflow`]: decode link, redeem, decrypt
//!
//! Collaborators are injected at construction. Each call is independent; the
//! remote store is the only state shared between invocations. Store calls are
//! bounded by the workflow's timeout and never retried.

pub mod create;
pub mod redeem;

pub use create::SecretCreationWorkflow;
pub use redeem::{RedemptionStage, SecretRedemptionWorkflow};

use crate::store::{StoreError, StoreResult};
use std::future::Future;
use std::time::Duration;

async fn bounded<T>(limit: Duration, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(StoreError::Timeout(limit)))
}
