//! Identifier and key generation for new secrets.
//!
//! Both values are drawn from a cryptographically secure source. If that
//! source cannot be read the generator fails; there is no fallback to a
//! weaker generator.

use super::{MessageId, SymmetricKey};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use thiserror::Error;
use uuid::Builder;
use zeroize::Zeroizing;

/// Number of random bytes in a symmetric key.
pub const KEY_LEN: usize = 32;

const ID_LEN: usize = 16;

/// The secure random source could not be read.
#[derive(Debug, Error)]
#[error("secure random source unavailable: {0}")]
pub struct EntropySourceUnavailable(pub String);

/// Source of cryptographically secure random bytes.
pub trait SecureRandomSource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropySourceUnavailable>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomSource;

impl SecureRandomSource for OsRandomSource {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropySourceUnavailable> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| EntropySourceUnavailable(e.to_string()))
    }
}

/// Produces a fresh `(MessageId, SymmetricKey)` pair per secret.
#[derive(Clone)]
pub struct IdentifierKeyGenerator {
    source: Arc<dyn SecureRandomSource>,
}

impl IdentifierKeyGenerator {
    pub fn new(source: Arc<dyn SecureRandomSource>) -> Self {
        Self { source }
    }

    /// Generator backed by the operating system CSPRNG.
    pub fn os() -> Self {
        Self::new(Arc::new(OsRandomSource))
    }

    /// Generate a new identifier and an independent key.
    ///
    /// The identifier is a version-4 UUID built from 128 random bits; the key
    /// is [`KEY_LEN`] random bytes encoded as unpadded URL-safe base64, whose
    /// alphabet never contains the link separator.
    pub fn generate(&self) -> Result<(MessageId, SymmetricKey), EntropySourceUnavailable> {
        let mut id_bytes = [0u8; ID_LEN];
        self.source.fill(&mut id_bytes)?;
        let id = Builder::from_random_bytes(id_bytes).into_uuid();

        let mut key_bytes = Zeroizing::new([0u8; KEY_LEN]);
        self.source.fill(&mut key_bytes[..])?;
        let key = SymmetricKey::new(BASE64_URL.encode(&key_bytes[..]));

        Ok((MessageId::new(id.hyphenated().to_string()), key))
    }
}

impl Default for IdentifierKeyGenerator {
    fn default() -> Self {
        Self::os()
    }
}

impl std::fmt::Debug for IdentifierKeyGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierKeyGenerator").finish_non_exhaustive()
    }
}
