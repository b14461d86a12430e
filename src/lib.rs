pub mod cipher;
pub mod config;
pub mod error;
pub mod link;
pub mod presentation;
pub mod secret;
pub mod store;
pub mod workflow;

pub use config::AppConfig;
pub use error::{CreationError, CreationResult, RedemptionError, RedemptionResult};
pub use link::{LinkCodec, LinkFormatError, ShareableLink};
pub use secret::{MessageId, PlaintextMessage, SymmetricKey};
pub use workflow::{SecretCreationWorkflow, SecretRedemptionWorkflow};
