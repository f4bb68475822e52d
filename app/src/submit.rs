//! Single-field settings edits.

use std::sync::Arc;

use roulette_client::Backend;
use serde_json::Value;
use settings_tree::{coerce_for_path, path};

use crate::error::{CoreError, Result};
use crate::store::SettingsStore;

/// Pushes one field change to the backend and mirrors it locally once the
/// backend has accepted it.
#[derive(Clone)]
pub struct ChangeSubmitter {
    store: SettingsStore,
    backend: Arc<dyn Backend>,
}

impl ChangeSubmitter {
    pub fn new(store: SettingsStore, backend: Arc<dyn Backend>) -> Self {
        Self { store, backend }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Submit `value` for `path`.
    ///
    /// The first path segment selects the backend category; the rest becomes
    /// a minimal nested payload. Environment-controlled paths are refused
    /// without touching the network. Returns the value as stored.
    pub async fn submit(&self, path: &str, value: Value) -> Result<Value> {
        let segments = path::segments(path)?;
        let Some((category, tail)) = segments.split_first() else {
            return Err(CoreError::Validation(format!("Invalid setting '{path}'")));
        };
        if tail.is_empty() {
            return Err(CoreError::Validation(format!(
                "'{path}' is a category, not a setting"
            )));
        }

        if self.store.resolve(path).await.overridden {
            tracing::info!(path, "Refusing to change environment-controlled setting");
            return Err(CoreError::override_conflict(path));
        }
        // The local write after a confirmed change must not fail.
        self.store.check_writable(path).await?;

        let value = coerce_for_path(path, value);
        let payload = path::nest(tail, value.clone());
        tracing::debug!(category, %payload, "Submitting setting");

        self.backend
            .update_settings(category, &payload)
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to save setting"))?;

        self.store.commit(path, value.clone()).await?;
        tracing::info!(path, "Setting saved");
        Ok(value)
    }
}
