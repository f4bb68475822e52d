use async_trait::async_trait;
use serde_json::Value;

use super::BackendClient;
use super::models::SettingsSnapshot;
use crate::Result;

/// Settings snapshot and category-scoped partial updates.
#[async_trait]
pub trait SettingsApi: Send + Sync {
    /// `GET /api/settings`: full configuration plus environment overrides.
    async fn load_settings(&self) -> Result<SettingsSnapshot>;

    /// `POST /api/settings/{category}` with a partial nested object.
    async fn update_settings(&self, category: &str, payload: &Value) -> Result<Value>;
}

#[async_trait]
impl SettingsApi for BackendClient {
    async fn load_settings(&self) -> Result<SettingsSnapshot> {
        self.get_json(&["api", "settings"]).await
    }

    async fn update_settings(&self, category: &str, payload: &Value) -> Result<Value> {
        self.post_json(&["api", "settings", category], payload).await
    }
}
