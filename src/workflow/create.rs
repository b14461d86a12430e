use super::bounded;
use crate::cipher::{ChaChaCipher, CipherGateway};
use crate::error::{CreationError, CreationResult};
use crate::link::{LinkCodec, ShareableLink};
use crate::secret::{IdentifierKeyGenerator, PlaintextMessage};
use crate::store::RemoteStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Turns a plaintext message into a shareable read-once link.
#[derive(Clone)]
pub struct SecretCreationWorkflow {
    generator: IdentifierKeyGenerator,
    cipher: Arc<dyn CipherGateway>,
    store: Arc<dyn RemoteStore>,
    codec: LinkCodec,
    timeout: Duration,
}

impl SecretCreationWorkflow {
    pub fn new(
        generator: IdentifierKeyGenerator,
        cipher: Arc<dyn CipherGateway>,
        store: Arc<dyn RemoteStore>,
        codec: LinkCodec,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            cipher,
            store,
            codec,
            timeout,
        }
    }

    /// OS randomness and ChaCha20-Poly1305 in front of `store`.
    pub fn with_defaults(store: Arc<dyn RemoteStore>, codec: LinkCodec, timeout: Duration) -> Self {
        Self::new(
            IdentifierKeyGenerator::os(),
            Arc::new(ChaChaCipher::new()),
            store,
            codec,
            timeout,
        )
    }

    /// Encrypt `plaintext`, publish the ciphertext and return the link.
    ///
    /// Nothing is sent remotely unless encryption succeeded. On any failure
    /// the fresh id and key are dropped; calling again starts over with a
    /// new pair.
    pub async fn create(&self, plaintext: &PlaintextMessage) -> CreationResult<ShareableLink> {
        let (id, key) = self.generator.generate().map_err(|e| {
            warn!("Key generation failed: {}", e);
            CreationError::KeyGenerationFailed(e)
        })?;

        let payload = self.cipher.encrypt(plaintext, &key).map_err(|e| {
            warn!(id = %id, "Encryption failed: {}", e);
            CreationError::EncryptionFailed(e)
        })?;
        debug!(id = %id, bytes = payload.as_bytes().len(), "message encrypted");

        bounded(self.timeout, self.store.create(&id, &payload))
            .await
            .map_err(|e| {
                warn!(id = %id, "Publishing failed: {}", e);
                CreationError::PublishFailed(e)
            })?;

        info!(id = %id, "secret published");
        Ok(self.codec.encode(&id, &key))
    }
}

impl std::fmt::Debug for SecretCreationWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCreationWorkflow")
            .field("codec", &self.codec)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
