use super::bounded;
use crate::cipher::{ChaChaCipher, CipherGateway};
use crate::error::{RedemptionError, RedemptionResult};
use crate::link::LinkCodec;
use crate::secret::PlaintextMessage;
use crate::store::RemoteStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Progress of a single redemption attempt.
///
/// `Idle -> Decoded -> Fetched -> Decrypted`. A failure is terminal and there
/// is no retry edge; another attempt needs another call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionStage {
    Idle,
    Decoded,
    Fetched,
    Decrypted,
}

impl RedemptionError {
    /// Last stage the attempt reached before failing.
    pub fn failed_at(&self) -> RedemptionStage {
        match self {
            Self::InvalidLink(_) => RedemptionStage::Idle,
            Self::UnavailableOrConsumed | Self::FetchFailed(_) => RedemptionStage::Decoded,
            Self::DecryptionFailed(_) => RedemptionStage::Fetched,
        }
    }

    /// Whether the remote copy is gone after this failure.
    pub fn message_destroyed(&self) -> bool {
        self.failed_at() == RedemptionStage::Fetched
    }
}

/// Turns a shareable link back into its message, consuming the remote copy.
#[derive(Clone)]
pub struct SecretRedemptionWorkflow {
    cipher: Arc<dyn CipherGateway>,
    store: Arc<dyn RemoteStore>,
    codec: LinkCodec,
    timeout: Duration,
}

impl SecretRedemptionWorkflow {
    pub fn new(
        cipher: Arc<dyn CipherGateway>,
        store: Arc<dyn RemoteStore>,
        codec: LinkCodec,
        timeout: Duration,
    ) -> Self {
        Self {
            cipher,
            store,
            codec,
            timeout,
        }
    }

    /// ChaCha20-Poly1305 in front of `store`.
    pub fn with_defaults(store: Arc<dyn RemoteStore>, codec: LinkCodec, timeout: Duration) -> Self {
        Self::new(Arc::new(ChaChaCipher::new()), store, codec, timeout)
    }

    /// Decode `candidate`, redeem its payload and decrypt it.
    ///
    /// The remote record is invalidated by the fetch, before decryption is
    /// attempted. A link with a wrong or damaged key therefore destroys the
    /// message without revealing it.
    pub async fn redeem(&self, candidate: &str) -> RedemptionResult<PlaintextMessage> {
        let (id, key) = self.codec.decode(candidate).map_err(|e| {
            warn!("Rejected link: {}", e);
            RedemptionError::InvalidLink(e)
        })?;
        debug!(id = %id, stage = ?RedemptionStage::Decoded, "link decoded");

        let payload = bounded(self.timeout, self.store.redeem(&id))
            .await
            .map_err(|e| {
                let err = RedemptionError::from(e);
                warn!(id = %id, "Fetch failed: {}", err);
                err
            })?;
        debug!(id = %id, stage = ?RedemptionStage::Fetched, "payload fetched");

        let plaintext = self.cipher.decrypt(&payload, &key).map_err(|e| {
            warn!(id = %id, "Decryption failed, message is gone: {}", e);
            RedemptionError::DecryptionFailed(e)
        })?;

        info!(id = %id, stage = ?RedemptionStage::Decrypted, "secret redeemed");
        Ok(plaintext)
    }
}

impl std::fmt::Debug for SecretRedemptionWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRedemptionWorkflow")
            .field("codec", &self.codec)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::CipherError;
    use crate::link::LinkFormatError;
    use crate::secret::{EncryptedPayload, IdentifierKeyGenerator, MessageId};
    use crate::store::{InMemoryRemoteStore, StoreError, StoreResult};
    use async_trait::async_trait;

    const BASE: &str = "https://cipherb.in";

    struct StallingStore;

    #[async_trait]
    impl RemoteStore for StallingStore {
        async fn create(&self, _: &MessageId, _: &EncryptedPayload) -> StoreResult<()> {
            Ok(())
        }

        async fn redeem(&self, _: &MessageId) -> StoreResult<EncryptedPayload> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(StoreError::NotFound)
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl RemoteStore for BrokenStore {
        async fn create(&self, _: &MessageId, _: &EncryptedPayload) -> StoreResult<()> {
            Err(StoreError::Transport("connection reset".to_string()))
        }

        async fn redeem(&self, _: &MessageId) -> StoreResult<EncryptedPayload> {
            Err(StoreError::Transport("connection reset".to_string()))
        }
    }

    fn workflow_with(store: Arc<dyn RemoteStore>, timeout: Duration) -> SecretRedemptionWorkflow {
        SecretRedemptionWorkflow::with_defaults(store, LinkCodec::new(BASE), timeout)
    }

    /// Encrypt and store `text` directly, returning the link.
    async fn seed(store: &InMemoryRemoteStore, text: &str) -> String {
        let (id, key) = IdentifierKeyGenerator::os().generate().unwrap();
        let payload = ChaChaCipher::new()
            .encrypt(&PlaintextMessage::new(text), &key)
            .unwrap();
        store.create(&id, &payload).await.unwrap();
        LinkCodec::new(BASE).encode(&id, &key).as_str().to_string()
    }

    #[tokio::test]
    async fn test_redeem_once() {
        let store = InMemoryRemoteStore::shared();
        let link = seed(&store, "hello world").await;
        let workflow = workflow_with(store.clone(), Duration::from_secs(5));

        let message = workflow.redeem(&link).await.unwrap();
        assert_eq!(message.as_str(), "hello world");
        assert!(store.is_empty());

        let second = workflow.redeem(&link).await.unwrap_err();
        assert!(matches!(second, RedemptionError::UnavailableOrConsumed));
        assert_eq!(second.failed_at(), RedemptionStage::Decoded);
    }

    #[tokio::test]
    async fn test_invalid_link_never_touches_store() {
        let store = InMemoryRemoteStore::shared();
        let link = seed(&store, "keep me").await;
        let workflow = workflow_with(store.clone(), Duration::from_secs(5));

        let foreign = link.replace("https://cipherb.in", "https://cipherbin.example");
        let err = workflow.redeem(&foreign).await.unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::InvalidLink(LinkFormatError::WrongOrigin)
        ));
        assert_eq!(err.failed_at(), RedemptionStage::Idle);
        assert_eq!(store.len(), 1);

        let without_key = link.split(';').next().unwrap().to_string();
        let err = workflow.redeem(&without_key).await.unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::InvalidLink(LinkFormatError::MalformedStructure)
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_identifier() {
        let store = InMemoryRemoteStore::shared();
        let workflow = workflow_with(store, Duration::from_secs(5));

        let err = workflow
            .redeem("https://cipherb.in/msg?bin=does-not-exist;c29tZWtleQ")
            .await
            .unwrap_err();
        assert!(matches!(err, RedemptionError::UnavailableOrConsumed));
    }

    #[tokio::test]
    async fn test_wrong_key_destroys_message() {
        let store = InMemoryRemoteStore::shared();
        let link = seed(&store, "fragile").await;
        let (id, _) = LinkCodec::new(BASE).decode(&link).unwrap();
        let (_, other_key) = IdentifierKeyGenerator::os().generate().unwrap();
        let tampered = LinkCodec::new(BASE).encode(&id, &other_key);

        let workflow = workflow_with(store.clone(), Duration::from_secs(5));
        let err = workflow.redeem(tampered.as_str()).await.unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::DecryptionFailed(CipherError::AuthenticationFailed)
        ));
        assert!(err.message_destroyed());

        // The genuine link no longer works either.
        let err = workflow.redeem(&link).await.unwrap_err();
        assert!(matches!(err, RedemptionError::UnavailableOrConsumed));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let workflow = workflow_with(Arc::new(BrokenStore), Duration::from_secs(5));
        let err = workflow
            .redeem("https://cipherb.in/msg?bin=abc;def")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::FetchFailed(StoreError::Transport(_))
        ));
        assert!(!err.message_destroyed());
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let workflow = workflow_with(Arc::new(StallingStore), Duration::from_millis(50));
        let err = workflow
            .redeem("https://cipherb.in/msg?bin=abc;def")
            .await
            .unwrap_err();
        assert!(matches!(err, RedemptionError::FetchFailed(StoreError::Timeout(_))));
    }
}
