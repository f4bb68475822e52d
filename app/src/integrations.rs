//! One-shot integration lookups and account actions outside a pairing
//! session: Trakt status, library and user listings, Jellyfin login and
//! device scans.

use std::sync::Arc;

use roulette_client::{AppleTvDevice, Backend, JellyfinAuth, LgTvDevice, TraktDisconnect, TraktStatus};
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::store::SettingsStore;
use crate::submit::ChangeSubmitter;

#[derive(Clone)]
pub struct Integrations {
    backend: Arc<dyn Backend>,
    submitter: ChangeSubmitter,
}

impl Integrations {
    pub fn new(backend: Arc<dyn Backend>, submitter: ChangeSubmitter) -> Self {
        Self { backend, submitter }
    }

    fn store(&self) -> &SettingsStore {
        self.submitter.store()
    }

    /// Current text value of `path`, empty when unset.
    async fn text(&self, path: &str) -> String {
        match self.store().get(path).await {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub async fn trakt_status(&self) -> Result<TraktStatus> {
        self.backend
            .trakt_status()
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to check Trakt status"))
    }

    /// Remove the stored Trakt tokens and turn the integration off.
    pub async fn trakt_disconnect(&self) -> Result<()> {
        let outcome = self
            .backend
            .trakt_disconnect()
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to disconnect Trakt"))?;
        match outcome {
            TraktDisconnect::EnvControlled => Err(CoreError::override_conflict("trakt.enabled")),
            TraktDisconnect::Disconnected => {
                tracing::info!("Trakt disconnected");
                self.submitter
                    .submit("trakt.enabled", Value::Bool(false))
                    .await?;
                Ok(())
            }
        }
    }

    async fn plex_credentials(&self) -> Result<(String, String)> {
        let url = self.text("plex.url").await;
        let token = self.text("plex.token").await;
        if url.is_empty() || token.is_empty() {
            return Err(CoreError::Validation(
                "Plex URL and token are required".to_string(),
            ));
        }
        Ok((url, token))
    }

    pub async fn plex_libraries(&self) -> Result<Vec<String>> {
        let (url, token) = self.plex_credentials().await?;
        self.backend
            .plex_libraries(&url, &token)
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to fetch Plex libraries"))
    }

    pub async fn plex_users(&self) -> Result<Vec<String>> {
        let (url, token) = self.plex_credentials().await?;
        self.backend
            .plex_users(&url, &token)
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to fetch Plex users"))
    }

    /// Log in to Jellyfin and store the resulting API key and user id.
    ///
    /// `server_url` is stored too when it differs from the current value and
    /// is not pinned by the environment.
    pub async fn jellyfin_login(
        &self,
        server_url: &str,
        username: &str,
        password: &str,
    ) -> Result<JellyfinAuth> {
        let server_url = server_url.trim();
        if server_url.is_empty() || username.trim().is_empty() || password.is_empty() {
            return Err(CoreError::Validation(
                "Please enter server URL, username, and password".to_string(),
            ));
        }

        let auth = self
            .backend
            .jellyfin_auth(server_url, username.trim(), password)
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to log in to Jellyfin"))?;

        let url_editable = !self.store().resolve("jellyfin.url").await.overridden;
        if url_editable && self.text("jellyfin.url").await != server_url {
            self.submitter
                .submit("jellyfin.url", Value::String(server_url.to_string()))
                .await?;
        }
        self.submitter
            .submit("jellyfin.api_key", Value::String(auth.api_key.clone()))
            .await?;
        self.submitter
            .submit("jellyfin.user_id", Value::String(auth.user_id.clone()))
            .await?;
        tracing::info!("Jellyfin login stored");
        Ok(auth)
    }

    pub async fn jellyfin_users(&self) -> Result<Vec<String>> {
        let url = self.text("jellyfin.url").await;
        let api_key = self.text("jellyfin.api_key").await;
        if url.is_empty() || api_key.is_empty() {
            return Err(CoreError::Validation(
                "Jellyfin URL and API key are required".to_string(),
            ));
        }
        self.backend
            .jellyfin_users(&url, &api_key)
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to fetch Jellyfin users"))
    }

    /// Discovered Apple TVs; empty when the scan fails.
    pub async fn appletv_scan(&self) -> Vec<AppleTvDevice> {
        self.backend.appletv_scan().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Apple TV scan failed");
            Vec::new()
        })
    }

    /// Discovered LG TVs; empty when the scan fails.
    pub async fn lgtv_scan(&self) -> Vec<LgTvDevice> {
        self.backend.lgtv_scan().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "LG TV scan failed");
            Vec::new()
        })
    }
}
