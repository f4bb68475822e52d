use async_trait::async_trait;
use serde_json::json;

use super::BackendClient;
use super::models::{JellyfinAuth, JellyfinAuthReply, UserList};
use crate::{ClientError, Result};

/// Jellyfin login and user lookup.
#[async_trait]
pub trait JellyfinApi: Send + Sync {
    async fn jellyfin_auth(
        &self,
        server_url: &str,
        username: &str,
        password: &str,
    ) -> Result<JellyfinAuth>;

    async fn jellyfin_users(&self, jellyfin_url: &str, api_key: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl JellyfinApi for BackendClient {
    async fn jellyfin_auth(
        &self,
        server_url: &str,
        username: &str,
        password: &str,
    ) -> Result<JellyfinAuth> {
        let body = json!({
            "server_url": server_url,
            "username": username,
            "password": password,
        });
        let reply: JellyfinAuthReply = self.post_json(&["api", "jellyfin", "auth"], &body).await?;
        match reply {
            JellyfinAuthReply::Authenticated(auth) => Ok(auth),
            JellyfinAuthReply::Refused { error } => Err(ClientError::Rejected(error)),
        }
    }

    async fn jellyfin_users(&self, jellyfin_url: &str, api_key: &str) -> Result<Vec<String>> {
        let body = json!({ "jellyfin_url": jellyfin_url, "api_key": api_key });
        let resp: UserList = self.post_json(&["api", "jellyfin", "users"], &body).await?;
        Ok(resp.users)
    }
}
