//! Data model for a single shared secret.
//!
//! A secret is named by a [`MessageId`], protected by a [`SymmetricKey`] that
//! only ever lives in memory and inside the link text, and stored remotely as
//! an [`EncryptedPayload`]. Plaintext and key material are zeroized on drop
//! and redacted from `Debug` output so they cannot leak through logs.

pub mod keygen;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

pub use keygen::{EntropySourceUnavailable, IdentifierKeyGenerator, OsRandomSource, SecureRandomSource, KEY_LEN};

/// Opaque token naming one secret's remote record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap an identifier string.
    ///
    /// Identifiers produced by [`IdentifierKeyGenerator`] are hyphenated
    /// UUIDs; identifiers taken from a decoded link are accepted as-is.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Symmetric key in its link-embeddable text form.
///
/// Freshly generated keys are 32 random bytes as unpadded URL-safe base64.
/// Keys decoded from a link are kept verbatim; the cipher decides whether
/// they are usable.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey(Zeroizing<String>);

impl SymmetricKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Ciphertext plus nonce and authentication tag, as produced by the cipher.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedPayload(Vec<u8>);

impl EncryptedPayload {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Text form used on the wire to the remote store.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        BASE64.decode(encoded).map(Self)
    }
}

impl fmt::Debug for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedPayload")
            .field("len", &self.0.len())
            .finish()
    }
}

/// User message, on its way in (creation) or out (redemption).
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextMessage(Zeroizing<String>);

impl PlaintextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Zeroizing::new(text.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&str> for PlaintextMessage {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for PlaintextMessage {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl fmt::Debug for PlaintextMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaintextMessage(<redacted>)")
    }
}
