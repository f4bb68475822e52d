use async_trait::async_trait;
use serde_json::json;

use super::BackendClient;
use super::models::{AuthorizeResponse, StatusEnvelope, TraktDisconnect, TraktStatus};
use crate::api::request::extract_message;
use crate::{ClientError, Result};

/// Trakt account linking.
#[async_trait]
pub trait TraktApi: Send + Sync {
    async fn trakt_status(&self) -> Result<TraktStatus>;

    /// The authorization page the operator opens to obtain a one-time code.
    async fn trakt_authorize(&self) -> Result<String>;

    /// Exchange a one-time code for tokens (stored by the backend).
    async fn trakt_exchange_code(&self, code: &str) -> Result<()>;

    async fn trakt_disconnect(&self) -> Result<TraktDisconnect>;
}

#[async_trait]
impl TraktApi for BackendClient {
    async fn trakt_status(&self) -> Result<TraktStatus> {
        self.get_json(&["trakt", "status"]).await
    }

    async fn trakt_authorize(&self) -> Result<String> {
        let resp: AuthorizeResponse = self.get_json(&["trakt", "authorize"]).await?;
        Ok(resp.auth_url)
    }

    async fn trakt_exchange_code(&self, code: &str) -> Result<()> {
        let resp: StatusEnvelope = self
            .post_json(&["trakt", "token"], &json!({ "code": code }))
            .await?;
        match resp.status.as_deref() {
            Some("success") => Ok(()),
            _ => Err(ClientError::Rejected(
                resp.reason()
                    .unwrap_or_else(|| "Failed to get access token".into()),
            )),
        }
    }

    async fn trakt_disconnect(&self) -> Result<TraktDisconnect> {
        // The env-controlled answer arrives with a 400, so inspect the body
        // before judging the status.
        let url = self.endpoint(&["trakt", "disconnect"])?;
        let (status, body) = self.send_raw(self.http.get(url)).await?;
        let envelope: StatusEnvelope = serde_json::from_str(&body).unwrap_or_default();

        match envelope.status.as_deref() {
            Some("env_controlled") => Ok(TraktDisconnect::EnvControlled),
            Some("success") if status.is_success() => Ok(TraktDisconnect::Disconnected),
            _ if !status.is_success() => Err(ClientError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            }),
            _ => Err(ClientError::Rejected(
                envelope
                    .reason()
                    .unwrap_or_else(|| "Failed to disconnect Trakt".into()),
            )),
        }
    }
}
