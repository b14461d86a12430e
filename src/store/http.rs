use super::{RemoteStore, StoreError, StoreResult};
use crate::config::{endpoint_url, ApiConfig};
use crate::secret::{EncryptedPayload, MessageId};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Request body for storing a message
#[derive(Debug, Serialize)]
pub struct PostMessageRequest<'a> {
    pub uuid: &'a str,
    /// Base64 of the encrypted payload
    pub message: String,
}

/// Stored message as returned on redemption
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub uuid: String,
    pub message: String,
}

/// Client for the remote message API.
///
/// `POST {base}/msg` stores a payload, `GET {base}/msg?bin={id}` returns it
/// once and deletes it server-side.
pub struct HttpRemoteStore {
    http: Client,
    messages_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for HttpRemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemoteStore")
            .field("messages_url", &self.messages_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpRemoteStore {
    /// Create a client for the API at `base_url`; every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            messages_url: endpoint_url(base_url, "msg"),
            timeout,
        })
    }

    pub fn from_config(config: &ApiConfig) -> StoreResult<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    fn classify(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout)
        } else {
            e.into()
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn create(&self, id: &MessageId, payload: &EncryptedPayload) -> StoreResult<()> {
        let request = PostMessageRequest {
            uuid: id.as_str(),
            message: payload.to_base64(),
        };

        let response = self
            .http
            .post(&self.messages_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let err = self.classify(e);
                error!("Message upload failed: {}", err);
                err
            })?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(StoreError::Conflict);
        }
        if !status.is_success() {
            warn!("Message upload rejected with status {}", status);
            return Err(StoreError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(id = %id, "message uploaded");
        Ok(())
    }

    async fn redeem(&self, id: &MessageId) -> StoreResult<EncryptedPayload> {
        let response = self
            .http
            .get(&self.messages_url)
            .query(&[("bin", id.as_str())])
            .send()
            .await
            .map_err(|e| {
                let err = self.classify(e);
                error!("Message fetch failed: {}", err);
                err
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !status.is_success() {
            warn!("Message fetch rejected with status {}", status);
            return Err(StoreError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: MessageResponse = response.json().await.map_err(|e| self.classify(e))?;
        if body.uuid != id.as_str() {
            return Err(StoreError::InvalidResponse(
                "response is for a different message".to_string(),
            ));
        }

        let payload = EncryptedPayload::from_base64(&body.message)
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        debug!(id = %id, "message fetched");
        Ok(payload)
    }
}
