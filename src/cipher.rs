//! Symmetric encryption of message bodies.
//!
//! Uses ChaCha20-Poly1305: a fresh random 96-bit nonce per message, stored in
//! front of the ciphertext. The key comes from the link text, so a key that
//! does not decode to 32 bytes is a decryption failure like any other.

use crate::secret::{EncryptedPayload, PlaintextMessage, SymmetricKey, KEY_LEN};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

const NONCE_LEN: usize = 12;

/// Cipher errors
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Key is not a valid 32-byte key")]
    InvalidKey,

    #[error("Secure random source unavailable: {0}")]
    NonceUnavailable(String),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Payload too short to contain a nonce")]
    Truncated,

    #[error("Decryption failed - invalid ciphertext or wrong key")]
    AuthenticationFailed,

    #[error("Decrypted message is not valid UTF-8")]
    InvalidUtf8,
}

/// Result type for cipher operations
pub type CipherResult<T> = Result<T, CipherError>;

/// Encrypts and decrypts message bodies with a [`SymmetricKey`].
pub trait CipherGateway: Send + Sync {
    fn encrypt(
        &self,
        plaintext: &PlaintextMessage,
        key: &SymmetricKey,
    ) -> CipherResult<EncryptedPayload>;

    fn decrypt(
        &self,
        payload: &EncryptedPayload,
        key: &SymmetricKey,
    ) -> CipherResult<PlaintextMessage>;
}

/// ChaCha20-Poly1305 implementation of [`CipherGateway`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaChaCipher;

impl ChaChaCipher {
    pub fn new() -> Self {
        Self
    }
}

fn build_cipher(key: &SymmetricKey) -> CipherResult<ChaCha20Poly1305> {
    let key_bytes = Zeroizing::new(
        BASE64_URL
            .decode(key.as_str())
            .map_err(|_| CipherError::InvalidKey)?,
    );
    if key_bytes.len() != KEY_LEN {
        return Err(CipherError::InvalidKey);
    }
    ChaCha20Poly1305::new_from_slice(&key_bytes).map_err(|_| CipherError::InvalidKey)
}

impl CipherGateway for ChaChaCipher {
    fn encrypt(
        &self,
        plaintext: &PlaintextMessage,
        key: &SymmetricKey,
    ) -> CipherResult<EncryptedPayload> {
        let cipher = build_cipher(key)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| CipherError::NonceUnavailable(e.to_string()))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(EncryptedPayload::from_bytes(sealed))
    }

    fn decrypt(
        &self,
        payload: &EncryptedPayload,
        key: &SymmetricKey,
    ) -> CipherResult<PlaintextMessage> {
        let cipher = build_cipher(key)?;

        let bytes = payload.as_bytes();
        if bytes.len() < NONCE_LEN {
            return Err(CipherError::Truncated);
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::AuthenticationFailed)?;

        // On failure the bytes come back inside the error; wipe them there too.
        String::from_utf8(plaintext)
            .map(PlaintextMessage::new)
            .map_err(|e| {
                drop(Zeroizing::new(e.into_bytes()));
                CipherError::InvalidUtf8
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::IdentifierKeyGenerator;

    fn fresh_key() -> SymmetricKey {
        IdentifierKeyGenerator::os().generate().unwrap().1
    }

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = ChaChaCipher::new();
        let key = fresh_key();

        let payload = cipher
            .encrypt(&PlaintextMessage::new("Hello, World!"), &key)
            .unwrap();
        assert!(!payload
            .as_bytes()
            .windows(13)
            .any(|w| w == b"Hello, World!"));

        let decrypted = cipher.decrypt(&payload, &key).unwrap();
        assert_eq!(decrypted.as_str(), "Hello, World!");
    }

    #[test]
    fn test_nonce_is_fresh_per_message() {
        let cipher = ChaChaCipher::new();
        let key = fresh_key();
        let message = PlaintextMessage::new("same text");

        let a = cipher.encrypt(&message, &key).unwrap();
        let b = cipher.encrypt(&message, &key).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails() {
        let cipher = ChaChaCipher::new();
        let payload = cipher
            .encrypt(&PlaintextMessage::new("secret"), &fresh_key())
            .unwrap();

        let result = cipher.decrypt(&payload, &fresh_key());
        assert!(matches!(result, Err(CipherError::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let cipher = ChaChaCipher::new();
        let key = fresh_key();
        let payload = cipher
            .encrypt(&PlaintextMessage::new("secret"), &key)
            .unwrap();

        let mut bytes = payload.as_bytes().to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let result = cipher.decrypt(&EncryptedPayload::from_bytes(bytes), &key);
        assert!(matches!(result, Err(CipherError::AuthenticationFailed)));
    }

    #[test]
    fn test_malformed_key_rejected() {
        let cipher = ChaChaCipher::new();
        let message = PlaintextMessage::new("secret");

        let short = SymmetricKey::new("c2hvcnQ");
        assert!(matches!(
            cipher.encrypt(&message, &short),
            Err(CipherError::InvalidKey)
        ));

        let not_base64 = SymmetricKey::new("!!!!");
        assert!(matches!(
            cipher.encrypt(&message, &not_base64),
            Err(CipherError::InvalidKey)
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let cipher = ChaChaCipher::new();
        let result = cipher.decrypt(&EncryptedPayload::from_bytes(vec![1, 2, 3]), &fresh_key());
        assert!(matches!(result, Err(CipherError::Truncated)));
    }
}
