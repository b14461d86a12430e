//! Fixed user-facing text for each workflow error kind.
//!
//! Front ends show these sentences instead of formatting the error chain, so
//! nothing from a collaborator error reaches the user.

use crate::error::{CreationError, RedemptionError};
use crate::link::LinkFormatError;

pub fn creation_message(err: &CreationError) -> &'static str {
    match err {
        CreationError::KeyGenerationFailed(_) => {
            "we're sorry, your system could not provide secure randomness to protect your message"
        }
        CreationError::EncryptionFailed(_) => {
            "we're sorry, there was an error encrypting your message"
        }
        CreationError::PublishFailed(_) => {
            "we're sorry, there was an error sending your message, please try again"
        }
    }
}

pub fn redemption_message(err: &RedemptionError) -> &'static str {
    match err {
        RedemptionError::InvalidLink(LinkFormatError::WrongOrigin) => {
            "sorry, that doesn't look like a link to a message"
        }
        RedemptionError::InvalidLink(_) => "sorry, that seems to be an invalid link",
        RedemptionError::UnavailableOrConsumed => {
            "sorry, this message has either already been viewed and destroyed or it never existed at all"
        }
        RedemptionError::FetchFailed(_) => {
            "we're sorry, the message could not be fetched right now, please try again"
        }
        RedemptionError::DecryptionFailed(_) => {
            "we had trouble decrypting your message; it has been destroyed and cannot be recovered"
        }
    }
}
