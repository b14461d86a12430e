//! In-process read-once store.
//!
//! Holds payloads in a `DashMap`. Redemption removes the entry in a single
//! map operation, so concurrent redeems of one identifier yield exactly one
//! payload. Nothing is persisted.

use super::{RemoteStore, StoreError, StoreResult};
use crate::secret::{EncryptedPayload, MessageId};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Read-once payload store kept in memory.
#[derive(Default)]
pub struct InMemoryRemoteStore {
    records: DashMap<MessageId, EncryptedPayload>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, ready to inject into both workflows.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of payloads still waiting to be redeemed.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.records.contains_key(id)
    }
}

impl std::fmt::Debug for InMemoryRemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRemoteStore")
            .field("records", &self.records.len())
            .finish()
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn create(&self, id: &MessageId, payload: &EncryptedPayload) -> StoreResult<()> {
        match self.records.entry(id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(payload.clone());
                debug!(id = %id, "stored payload");
                Ok(())
            }
        }
    }

    async fn redeem(&self, id: &MessageId) -> StoreResult<EncryptedPayload> {
        let (_, payload) = self.records.remove(id).ok_or(StoreError::NotFound)?;
        debug!(id = %id, "redeemed payload");
        Ok(payload)
    }
}
