use async_trait::async_trait;
use serde_json::json;

use super::BackendClient;
use super::models::{LibraryList, PlexAuthCheck, PlexPin, UserList};
use crate::Result;

/// Plex PIN authorization and server lookups.
#[async_trait]
pub trait PlexApi: Send + Sync {
    /// Request a PIN challenge and the authorization page for it.
    async fn plex_request_pin(&self) -> Result<PlexPin>;

    /// Poll the challenge; `Some(token)` once the operator has authorized.
    async fn plex_check_auth(&self, client_id: &str) -> Result<Option<String>>;

    async fn plex_libraries(&self, plex_url: &str, plex_token: &str) -> Result<Vec<String>>;

    async fn plex_users(&self, plex_url: &str, plex_token: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl PlexApi for BackendClient {
    async fn plex_request_pin(&self) -> Result<PlexPin> {
        self.post_empty(&["api", "plex", "get_token"]).await
    }

    async fn plex_check_auth(&self, client_id: &str) -> Result<Option<String>> {
        let resp: PlexAuthCheck = self
            .get_json(&["api", "plex", "check_auth", client_id])
            .await?;
        Ok(resp.token.filter(|t| !t.is_empty()))
    }

    async fn plex_libraries(&self, plex_url: &str, plex_token: &str) -> Result<Vec<String>> {
        let body = json!({ "plex_url": plex_url, "plex_token": plex_token });
        let resp: LibraryList = self.post_json(&["api", "plex", "libraries"], &body).await?;
        Ok(resp.libraries)
    }

    async fn plex_users(&self, plex_url: &str, plex_token: &str) -> Result<Vec<String>> {
        let body = json!({ "plex_url": plex_url, "plex_token": plex_token });
        let resp: UserList = self.post_json(&["api", "plex", "users"], &body).await?;
        Ok(resp.users)
    }
}
