use std::sync::Arc;

use roulette_client::{Backend, BackendClient};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::error::{CoreError, Result};
use crate::integrations::Integrations;
use crate::notify::{Notice, Notifier};
use crate::pairing::{PairingSessionManager, WindowOpener};
use crate::store::SettingsStore;
use crate::submit::ChangeSubmitter;

/// Everything one settings page session works with, wired together.
#[derive(Clone)]
pub struct SettingsConsole {
    inner: Arc<SettingsConsoleInner>,
}

struct SettingsConsoleInner {
    config: AppConfig,
    store: SettingsStore,
    submitter: ChangeSubmitter,
    pairing: PairingSessionManager,
    integrations: Integrations,
    notifier: Notifier,
}

impl SettingsConsole {
    /// Connect to the configured backend and load the settings snapshot.
    pub async fn connect(config: AppConfig, windows: Arc<dyn WindowOpener>) -> Result<Self> {
        let client = BackendClient::with_timeout(&config.backend_url, config.http_timeout)
            .map_err(|e| CoreError::transport(&e, "Invalid backend URL"))?;
        tracing::info!(backend = %client.base_url(), "Connecting to settings backend");
        Self::with_backend(config, Arc::new(client), windows).await
    }

    pub async fn with_backend(
        config: AppConfig,
        backend: Arc<dyn Backend>,
        windows: Arc<dyn WindowOpener>,
    ) -> Result<Self> {
        let store = SettingsStore::load(backend.as_ref()).await?;
        let notifier = Notifier::new();
        let submitter = ChangeSubmitter::new(store.clone(), backend.clone());
        let pairing = PairingSessionManager::new(
            backend.clone(),
            submitter.clone(),
            notifier.clone(),
            windows,
            config.plex_poll,
        );
        let integrations = Integrations::new(backend, submitter.clone());

        Ok(Self {
            inner: Arc::new(SettingsConsoleInner {
                config,
                store,
                submitter,
                pairing,
                integrations,
                notifier,
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &SettingsStore {
        &self.inner.store
    }

    pub fn pairing(&self) -> &PairingSessionManager {
        &self.inner.pairing
    }

    pub fn integrations(&self) -> &Integrations {
        &self.inner.integrations
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notifier.subscribe()
    }

    /// Submit one field edit and announce the outcome.
    pub async fn submit(&self, path: &str, value: Value) -> Result<Value> {
        let result = self.inner.submitter.submit(path, value).await;
        match &result {
            Ok(_) => self.inner.notifier.success(format!("Saved {path}")),
            Err(e) => {
                tracing::warn!(path, error = %e, "Setting not saved");
                self.inner.notifier.error(e.to_string());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use settings_tree::{ConfigTree, OverrideTree};

    use super::*;
    use crate::notify::NoticeLevel;
    use crate::testing::{FakeBackend, FakeWindows};

    async fn console(settings: Value, overrides: Value) -> (Arc<FakeBackend>, SettingsConsole) {
        let backend = FakeBackend::new();
        {
            let mut state = backend.state();
            state.snapshot.settings = ConfigTree::from_value(settings).unwrap();
            state.snapshot.env_overrides = OverrideTree::from_value(overrides).unwrap();
        }
        let console = SettingsConsole::with_backend(
            AppConfig::default(),
            backend.clone(),
            FakeWindows::new(),
        )
        .await
        .unwrap();
        (backend, console)
    }

    #[tokio::test]
    async fn test_toggle_plex_after_load() {
        let (_, console) = console(json!({"plex": {"enabled": false}}), json!({})).await;
        let mut notices = console.subscribe_notices();

        console.submit("plex.enabled", json!(true)).await.unwrap();

        assert_eq!(console.store().get("plex.enabled").await, Some(json!(true)));
        assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_env_pinned_trakt_toggle() {
        let (backend, console) = console(
            json!({"trakt": {"enabled": false}}),
            json!({"trakt": {
                "client_id": "x",
                "client_secret": "y",
                "access_token": "z",
                "refresh_token": "w"
            }}),
        )
        .await;
        let mut notices = console.subscribe_notices();

        assert!(console.store().resolve("trakt.enabled").await.env_enabled);
        let err = console
            .submit("trakt.enabled", json!(false))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::OverrideConflict { .. }));
        assert_eq!(backend.state().calls, vec!["load_settings"]);
        assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Error);
    }
}
