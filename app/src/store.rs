//! Settings state for one page session.
//!
//! Loaded once from the backend, read by everyone, written only by
//! [`ChangeSubmitter`](crate::submit::ChangeSubmitter) after the backend
//! has confirmed a change.

use std::sync::Arc;

use roulette_client::{SettingsApi, SettingsSnapshot};
use serde_json::Value;
use settings_tree::defaults::DEFAULT_SETTINGS;
use settings_tree::{
    ConfigTree, FeatureStatus, OverrideResolution, OverrideResolver, OverrideTree, TreeError,
};
use tokio::sync::RwLock;

use crate::error::{CoreError, Result};

/// Shared handle to the current configuration and override trees.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<StoreSnapshot>>,
}

/// Consistent copy of both trees, for one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub settings: ConfigTree,
    pub overrides: OverrideTree,
}

impl StoreSnapshot {
    pub fn resolver(&self) -> OverrideResolver<'_> {
        OverrideResolver::new(&self.settings, &self.overrides)
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.settings.get(path)
    }

    pub fn resolve(&self, path: &str) -> OverrideResolution {
        self.resolver().resolve(path)
    }

    /// Display value of `path`, with env-enabled toggles forced on.
    pub fn effective(&self, path: &str) -> Option<Value> {
        self.resolver().effective(path)
    }

    pub fn feature_status(&self) -> FeatureStatus {
        FeatureStatus::check(&self.settings, &self.overrides)
    }
}

impl SettingsStore {
    /// Fetch the startup snapshot from the backend.
    pub async fn load<B: SettingsApi + ?Sized>(backend: &B) -> Result<Self> {
        let snapshot = backend
            .load_settings()
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to load settings"))?;
        let store = Self::from_snapshot(snapshot);

        let status = store.snapshot().await.feature_status();
        if !status.is_ready() {
            tracing::warn!(
                "Missing settings: {:?}, warnings: {:?}",
                status.missing_settings,
                status.warnings
            );
        }
        tracing::info!("Settings loaded");
        Ok(store)
    }

    /// Build a store from an already-fetched snapshot, filling in defaults.
    pub fn from_snapshot(snapshot: SettingsSnapshot) -> Self {
        let SettingsSnapshot {
            mut settings,
            env_overrides,
        } = snapshot;
        settings.merge_defaults(&DEFAULT_SETTINGS);
        Self {
            inner: Arc::new(RwLock::new(StoreSnapshot {
                settings,
                overrides: env_overrides,
            })),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn get(&self, path: &str) -> Option<Value> {
        self.inner.read().await.get(path)
    }

    pub async fn resolve(&self, path: &str) -> OverrideResolution {
        self.inner.read().await.resolve(path)
    }

    pub async fn effective(&self, path: &str) -> Option<Value> {
        self.inner.read().await.effective(path)
    }

    pub(crate) async fn check_writable(&self, path: &str) -> std::result::Result<(), TreeError> {
        self.inner.read().await.settings.check_writable(path)
    }

    /// Write a backend-confirmed value into the configuration tree.
    pub(crate) async fn commit(&self, path: &str, value: Value) -> std::result::Result<(), TreeError> {
        self.inner.write().await.settings.set(path, value)
    }
}
