//! Shareable link grammar.
//!
//! A link has the exact shape
//!
//! ```text
//! <web base url>/msg?bin=<identifier>;<key>
//! ```
//!
//! Decoding only checks this grammar. Whether the identifier exists remotely
//! or the key actually decrypts anything is left to redemption, so callers can
//! tell a mistyped link apart from a consumed one.

use crate::secret::{MessageId, SymmetricKey};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

/// Path marker between the base address and the identifier.
pub const MESSAGE_PATH: &str = "/msg?bin=";

/// Separator between the identifier and the key.
pub const SEPARATOR: char = ';';

/// Reasons a candidate string is not a well-formed link.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LinkFormatError {
    #[error("link does not point at the configured message address")]
    WrongOrigin,

    #[error("link must contain exactly one ';' between identifier and key")]
    MalformedStructure,

    #[error("link has no message identifier")]
    MissingIdentifier,

    #[error("link has no decryption key")]
    MissingKey,
}

/// A link carrying both the identifier and the key of one secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ShareableLink(Zeroizing<String>);

impl ShareableLink {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareableLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ShareableLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Everything after the separator is key material.
        let visible = self.0.split(SEPARATOR).next().unwrap_or_default();
        write!(f, "ShareableLink({visible}{SEPARATOR}<redacted>)")
    }
}

/// Encodes and decodes links against one configured web base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCodec {
    prefix: String,
}

impl LinkCodec {
    /// Create a codec for `web_base_url`. A trailing slash on the configured
    /// address is dropped; candidate links themselves are never normalized.
    pub fn new(web_base_url: &str) -> Self {
        let base = web_base_url.trim_end_matches('/');
        Self {
            prefix: format!("{}{}", base, MESSAGE_PATH),
        }
    }

    /// Everything a valid link starts with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn encode(&self, id: &MessageId, key: &SymmetricKey) -> ShareableLink {
        debug_assert!(!id.as_str().contains(SEPARATOR));
        debug_assert!(!key.as_str().contains(SEPARATOR));

        ShareableLink(Zeroizing::new(format!(
            "{}{}{}{}",
            self.prefix,
            id.as_str(),
            SEPARATOR,
            key.as_str()
        )))
    }

    pub fn decode(&self, candidate: &str) -> Result<(MessageId, SymmetricKey), LinkFormatError> {
        let rest = candidate
            .strip_prefix(self.prefix.as_str())
            .ok_or(LinkFormatError::WrongOrigin)?;

        let mut segments = rest.split(SEPARATOR);
        let (id, key) = match (segments.next(), segments.next(), segments.next()) {
            (Some(id), Some(key), None) => (id, key),
            _ => return Err(LinkFormatError::MalformedStructure),
        };

        if id.is_empty() {
            return Err(LinkFormatError::MissingIdentifier);
        }
        if key.is_empty() {
            return Err(LinkFormatError::MissingKey);
        }
        if id.chars().chain(key.chars()).any(char::is_whitespace) {
            return Err(LinkFormatError::MalformedStructure);
        }

        Ok((MessageId::new(id), SymmetricKey::new(key)))
    }
}
