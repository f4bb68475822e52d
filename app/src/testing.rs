//! In-memory stand-ins for the backend and the popup opener.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use roulette_client::{
    AppleTvApi, AppleTvDevice, ClientError, JellyfinApi, JellyfinAuth, LgTvApi, LgTvDevice,
    PairingReply, PlexApi, PlexPin, SettingsApi, SettingsSnapshot, TraktApi, TraktDisconnect,
    TraktStatus,
};
use serde_json::Value;
use settings_tree::{ConfigTree, OverrideTree};

use crate::notify::Notifier;
use crate::pairing::{ExternalWindow, PairingSessionManager, PollSettings, WindowOpener};
use crate::store::SettingsStore;
use crate::submit::ChangeSubmitter;

type Reply<T> = std::result::Result<T, String>;

fn api_error(message: &str) -> ClientError {
    ClientError::Api {
        status: 400,
        message: Some(message.to_string()),
    }
}

fn reply<T>(r: Reply<T>) -> roulette_client::Result<T> {
    r.map_err(|m| api_error(&m))
}

/// Scripted backend. Every call is recorded in `calls`.
pub(crate) struct FakeState {
    pub calls: Vec<String>,
    pub snapshot: SettingsSnapshot,
    pub updates: Vec<(String, Value)>,
    pub update_error: Option<String>,
    /// Hold each accepted update this long before replying.
    pub update_delay: Option<Duration>,

    pub trakt_status: Reply<TraktStatus>,
    pub trakt_auth_url: String,
    pub trakt_codes: Vec<String>,
    pub trakt_exchange: Reply<()>,
    pub trakt_disconnect: Reply<TraktDisconnect>,

    pub plex_pin: Reply<PlexPin>,
    /// Check number (1-based) on which the token appears.
    pub plex_token_on: Option<u32>,
    pub plex_checks: u32,
    pub plex_lists: Reply<Vec<String>>,

    pub jellyfin_auth: Reply<JellyfinAuth>,
    pub jellyfin_users: Reply<Vec<String>>,

    pub appletv_devices: Reply<Vec<AppleTvDevice>>,
    pub appletv_has_credentials: bool,
    pub appletv_start: Reply<PairingReply>,
    pub appletv_pin_replies: VecDeque<Reply<PairingReply>>,
    pub appletv_pins: Vec<String>,
    pub appletv_cancels: Vec<String>,
    pub appletv_cancel_fails: bool,

    pub lgtv_devices: Reply<Vec<LgTvDevice>>,
    pub lgtv_validate: Reply<()>,
    pub lgtv_validations: Vec<(String, String)>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            snapshot: SettingsSnapshot::default(),
            updates: Vec::new(),
            update_error: None,
            update_delay: None,
            trakt_status: Ok(TraktStatus::default()),
            trakt_auth_url: "https://trakt.example/oauth".to_string(),
            trakt_codes: Vec::new(),
            trakt_exchange: Ok(()),
            trakt_disconnect: Ok(TraktDisconnect::Disconnected),
            plex_pin: Ok(PlexPin {
                auth_url: "https://plex.example/auth".to_string(),
                pin: "1234".to_string(),
                client_id: "client-1".to_string(),
            }),
            plex_token_on: None,
            plex_checks: 0,
            plex_lists: Ok(Vec::new()),
            jellyfin_auth: Ok(JellyfinAuth {
                api_key: "jf-key".to_string(),
                user_id: "jf-user".to_string(),
            }),
            jellyfin_users: Ok(Vec::new()),
            appletv_devices: Ok(Vec::new()),
            appletv_has_credentials: false,
            appletv_start: Ok(PairingReply::AwaitingPin),
            appletv_pin_replies: VecDeque::new(),
            appletv_pins: Vec::new(),
            appletv_cancels: Vec::new(),
            appletv_cancel_fails: false,
            lgtv_devices: Ok(Vec::new()),
            lgtv_validate: Ok(()),
            lgtv_validations: Vec::new(),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: &str) -> MutexGuard<'_, FakeState> {
        let mut state = self.state();
        state.calls.push(call.to_string());
        state
    }
}

#[async_trait]
impl SettingsApi for FakeBackend {
    async fn load_settings(&self) -> roulette_client::Result<SettingsSnapshot> {
        Ok(self.record("load_settings").snapshot.clone())
    }

    async fn update_settings(
        &self,
        category: &str,
        payload: &Value,
    ) -> roulette_client::Result<Value> {
        let delay = {
            let mut state = self.record("update_settings");
            if let Some(message) = &state.update_error {
                return Err(api_error(message));
            }
            state.updates.push((category.to_string(), payload.clone()));
            state.update_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Value::Null)
    }
}

#[async_trait]
impl TraktApi for FakeBackend {
    async fn trakt_status(&self) -> roulette_client::Result<TraktStatus> {
        reply(self.record("trakt_status").trakt_status.clone())
    }

    async fn trakt_authorize(&self) -> roulette_client::Result<String> {
        Ok(self.record("trakt_authorize").trakt_auth_url.clone())
    }

    async fn trakt_exchange_code(&self, code: &str) -> roulette_client::Result<()> {
        let mut state = self.record("trakt_exchange_code");
        state.trakt_codes.push(code.to_string());
        reply(state.trakt_exchange.clone())
    }

    async fn trakt_disconnect(&self) -> roulette_client::Result<TraktDisconnect> {
        reply(self.record("trakt_disconnect").trakt_disconnect.clone())
    }
}

#[async_trait]
impl PlexApi for FakeBackend {
    async fn plex_request_pin(&self) -> roulette_client::Result<PlexPin> {
        reply(self.record("plex_request_pin").plex_pin.clone())
    }

    async fn plex_check_auth(&self, _client_id: &str) -> roulette_client::Result<Option<String>> {
        let mut state = self.record("plex_check_auth");
        state.plex_checks += 1;
        let checks = state.plex_checks;
        let ready = state.plex_token_on.is_some_and(|n| checks >= n);
        Ok(ready.then(|| "plex-token".to_string()))
    }

    async fn plex_libraries(&self, _url: &str, _token: &str) -> roulette_client::Result<Vec<String>> {
        reply(self.record("plex_libraries").plex_lists.clone())
    }

    async fn plex_users(&self, _url: &str, _token: &str) -> roulette_client::Result<Vec<String>> {
        reply(self.record("plex_users").plex_lists.clone())
    }
}

#[async_trait]
impl JellyfinApi for FakeBackend {
    async fn jellyfin_auth(
        &self,
        _server_url: &str,
        _username: &str,
        _password: &str,
    ) -> roulette_client::Result<JellyfinAuth> {
        reply(self.record("jellyfin_auth").jellyfin_auth.clone())
    }

    async fn jellyfin_users(&self, _url: &str, _api_key: &str) -> roulette_client::Result<Vec<String>> {
        reply(self.record("jellyfin_users").jellyfin_users.clone())
    }
}

#[async_trait]
impl AppleTvApi for FakeBackend {
    async fn appletv_scan(&self) -> roulette_client::Result<Vec<AppleTvDevice>> {
        reply(self.record("appletv_scan").appletv_devices.clone())
    }

    async fn appletv_check_credentials(&self, _device_id: &str) -> roulette_client::Result<bool> {
        Ok(self.record("appletv_check_credentials").appletv_has_credentials)
    }

    async fn appletv_start_pairing(&self, _device_id: &str) -> roulette_client::Result<PairingReply> {
        reply(self.record("appletv_start_pairing").appletv_start.clone())
    }

    async fn appletv_submit_pin(
        &self,
        _device_id: &str,
        pin: &str,
    ) -> roulette_client::Result<PairingReply> {
        let mut state = self.record("appletv_submit_pin");
        state.appletv_pins.push(pin.to_string());
        let next = state
            .appletv_pin_replies
            .pop_front()
            .unwrap_or(Ok(PairingReply::Success));
        reply(next)
    }

    async fn appletv_cancel(&self, device_id: &str) -> roulette_client::Result<()> {
        let mut state = self.record("appletv_cancel");
        state.appletv_cancels.push(device_id.to_string());
        if state.appletv_cancel_fails {
            return Err(api_error("No pairing in progress"));
        }
        Ok(())
    }
}

#[async_trait]
impl LgTvApi for FakeBackend {
    async fn lgtv_scan(&self) -> roulette_client::Result<Vec<LgTvDevice>> {
        reply(self.record("lgtv_scan").lgtv_devices.clone())
    }

    async fn lgtv_validate(&self, ip: &str, mac: &str) -> roulette_client::Result<()> {
        let mut state = self.record("lgtv_validate");
        state.lgtv_validations.push((ip.to_string(), mac.to_string()));
        reply(state.lgtv_validate.clone())
    }
}

/// Observes one opened window from the test side.
#[derive(Debug, Clone, Default)]
pub(crate) struct WindowProbe {
    closed_by_user: Arc<AtomicBool>,
    close_calls: Arc<AtomicU32>,
}

impl WindowProbe {
    pub fn close_by_user(&self) {
        self.closed_by_user.store(true, Ordering::SeqCst);
    }

    pub fn close_calls(&self) -> u32 {
        self.close_calls.load(Ordering::SeqCst)
    }
}

struct FakeWindow {
    probe: WindowProbe,
}

impl ExternalWindow for FakeWindow {
    fn is_closed(&self) -> bool {
        self.probe.closed_by_user.load(Ordering::SeqCst) || self.probe.close_calls() > 0
    }

    fn close(&mut self) {
        self.probe.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct FakeWindows {
    pub blocked: AtomicBool,
    opened: Mutex<Vec<(String, WindowProbe)>>,
}

impl FakeWindows {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn last(&self) -> WindowProbe {
        self.opened.lock().unwrap().last().unwrap().1.clone()
    }
}

impl WindowOpener for FakeWindows {
    fn open(&self, url: &str) -> Option<Box<dyn ExternalWindow>> {
        if self.blocked.load(Ordering::SeqCst) {
            return None;
        }
        let probe = WindowProbe::default();
        self.opened
            .lock()
            .unwrap()
            .push((url.to_string(), probe.clone()));
        Some(Box::new(FakeWindow { probe }))
    }
}

pub(crate) fn store_with(settings: Value, overrides: Value) -> SettingsStore {
    SettingsStore::from_snapshot(SettingsSnapshot {
        settings: ConfigTree::from_value(settings).unwrap(),
        env_overrides: OverrideTree::from_value(overrides).unwrap(),
    })
}

pub(crate) const TEST_POLL: PollSettings = PollSettings {
    interval: Duration::from_millis(2000),
    max_attempts: 3,
};

/// Everything a pairing test needs, wired to fakes.
pub(crate) struct Harness {
    pub backend: Arc<FakeBackend>,
    pub windows: Arc<FakeWindows>,
    pub notifier: Notifier,
    pub store: SettingsStore,
    pub manager: PairingSessionManager,
}

impl Harness {
    pub fn new(settings: Value, overrides: Value) -> Self {
        let backend = FakeBackend::new();
        let windows = FakeWindows::new();
        let notifier = Notifier::new();
        let store = store_with(settings, overrides);
        let submitter = ChangeSubmitter::new(store.clone(), backend.clone());
        let manager = PairingSessionManager::new(
            backend.clone(),
            submitter,
            notifier.clone(),
            windows.clone(),
            TEST_POLL,
        );
        Self {
            backend,
            windows,
            notifier,
            store,
            manager,
        }
    }
}
