//! Linking workflows for external services and devices.
//!
//! Each [`PairingKind`] is a small state machine driven by one task. The
//! manager guarantees at most one live session per kind; callers watch a
//! [`SessionHandle`] for state changes and feed operator input through it.

mod appletv;
mod lgtv;
mod mac;
mod plex;
mod session;
mod trakt;
mod window;


use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use roulette_client::Backend;
use serde::Serialize;

pub use mac::{format_mac_input, is_complete_mac};
pub use session::{Prompt, SessionHandle, SessionInput, SessionSnapshot, SessionState};
pub use window::{ExternalWindow, WindowOpener};

use crate::error::{CoreError, Result};
use crate::notify::Notifier;
use crate::store::SettingsStore;
use crate::submit::ChangeSubmitter;
use session::{Flow, SessionCore, Terminal, Workflow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairingKind {
    TraktCode,
    PlexPin,
    AppletvPin,
    LgtvScan,
}

impl PairingKind {
    pub const ALL: [PairingKind; 4] = [
        Self::TraktCode,
        Self::PlexPin,
        Self::AppletvPin,
        Self::LgtvScan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TraktCode => "trakt-code",
            Self::PlexPin => "plex-pin",
            Self::AppletvPin => "appletv-pin",
            Self::LgtvScan => "lgtv-scan",
        }
    }
}

impl fmt::Display for PairingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to link, with the parameters its kind needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingParams {
    TraktCode,
    PlexPin,
    AppleTvPin { device_id: String },
    LgTvScan,
}

impl PairingParams {
    pub fn kind(&self) -> PairingKind {
        match self {
            Self::TraktCode => PairingKind::TraktCode,
            Self::PlexPin => PairingKind::PlexPin,
            Self::AppleTvPin { .. } => PairingKind::AppletvPin,
            Self::LgTvScan => PairingKind::LgtvScan,
        }
    }
}

/// Poll cadence for workflows that wait on an external approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 60,
        }
    }
}

/// Collaborators shared by every workflow.
pub(crate) struct PairingContext {
    pub backend: Arc<dyn Backend>,
    pub submitter: ChangeSubmitter,
    pub windows: Arc<dyn WindowOpener>,
    pub plex_poll: PollSettings,
}

impl PairingContext {
    pub fn store(&self) -> &SettingsStore {
        self.submitter.store()
    }

    /// Refuse to start when any of `paths` is pinned by the environment.
    pub async fn ensure_editable(&self, paths: &[&str]) -> Result<()> {
        let snapshot = self.store().snapshot().await;
        match paths.iter().find(|p| snapshot.resolve(p).overridden) {
            Some(path) => Err(CoreError::override_conflict(path)),
            None => Ok(()),
        }
    }
}

/// Starts, tracks and cancels pairing sessions.
#[derive(Clone)]
pub struct PairingSessionManager {
    ctx: Arc<PairingContext>,
    notifier: Notifier,
    sessions: Arc<Mutex<HashMap<PairingKind, SessionHandle>>>,
}

impl PairingSessionManager {
    pub fn new(
        backend: Arc<dyn Backend>,
        submitter: ChangeSubmitter,
        notifier: Notifier,
        windows: Arc<dyn WindowOpener>,
        plex_poll: PollSettings,
    ) -> Self {
        Self {
            ctx: Arc::new(PairingContext {
                backend,
                submitter,
                windows,
                plex_poll,
            }),
            notifier,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start a session of the kind `params` names.
    ///
    /// Returns once the session is interactive or has already ended. Failures
    /// before that point (popup blocked, override conflict, backend errors)
    /// are returned as `Err` and have already been announced as a notice.
    pub async fn start(&self, params: PairingParams) -> Result<SessionHandle> {
        let kind = params.kind();
        let (core, handle, inputs) = self
            .reserve(kind)
            .inspect_err(|e| self.notifier.error(e.to_string()))?;
        let ctx = self.ctx.clone();
        match params {
            PairingParams::TraktCode => {
                self.launch(trakt::TraktCodeFlow::new(ctx), core, inputs, handle)
                    .await
            }
            PairingParams::PlexPin => {
                self.launch(plex::PlexPinFlow::new(ctx), core, inputs, handle)
                    .await
            }
            PairingParams::AppleTvPin { device_id } => {
                self.launch(
                    appletv::AppleTvPinFlow::new(ctx, device_id),
                    core,
                    inputs,
                    handle,
                )
                .await
            }
            PairingParams::LgTvScan => {
                self.launch(lgtv::LgTvScanFlow::new(ctx), core, inputs, handle)
                    .await
            }
        }
    }

    /// Cancel the live session of `kind`. Returns whether one was running.
    pub fn cancel(&self, kind: PairingKind) -> bool {
        match self.session(kind) {
            Some(handle) if handle.is_active() => {
                tracing::info!(%kind, "Cancelling pairing session");
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn cancel_all(&self) {
        for kind in PairingKind::ALL {
            self.cancel(kind);
        }
    }

    /// The most recent session of `kind`, live or ended.
    pub fn session(&self, kind: PairingKind) -> Option<SessionHandle> {
        self.lock().get(&kind).cloned()
    }

    /// Whether the control that starts a `kind` session should be enabled.
    pub fn trigger_enabled(&self, kind: PairingKind) -> bool {
        !self.session(kind).is_some_and(|h| h.is_active())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PairingKind, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the slot for `kind` before anything can suspend.
    fn reserve(
        &self,
        kind: PairingKind,
    ) -> Result<(SessionCore, SessionHandle, tokio::sync::mpsc::Receiver<SessionInput>)> {
        let mut sessions = self.lock();
        if sessions.get(&kind).is_some_and(SessionHandle::is_active) {
            return Err(CoreError::SessionActive(kind));
        }
        let (core, handle, inputs) = session::open(kind, self.notifier.clone());
        sessions.insert(kind, handle.clone());
        Ok((core, handle, inputs))
    }

    async fn launch<W: Workflow>(
        &self,
        mut workflow: W,
        mut core: SessionCore,
        inputs: tokio::sync::mpsc::Receiver<SessionInput>,
        handle: SessionHandle,
    ) -> Result<SessionHandle> {
        tracing::info!(kind = %core.kind(), "Pairing session started");
        let cancel = core.cancel_token();
        let begun = session::interruptible(&cancel, workflow.begin(&mut core))
            .await
            .unwrap_or(Err(CoreError::Cancelled));

        match begun {
            Ok(Flow::Continue) => {
                let submitter = self.ctx.submitter.clone();
                tokio::spawn(session::drive(workflow, core, inputs, submitter));
                Ok(handle)
            }
            Ok(Flow::Persist(writes)) => {
                match session::persist(&self.ctx.submitter, writes).await {
                    Ok(()) => {
                        core.finish(Terminal::Success, workflow.success_message());
                        Ok(handle)
                    }
                    Err(err) => {
                        core.finish(Terminal::from_error(&err), workflow.success_message());
                        Err(err)
                    }
                }
            }
            Ok(Flow::Done(terminal)) => {
                core.finish(terminal, workflow.success_message());
                Ok(handle)
            }
            Err(err) => {
                if matches!(err, CoreError::Cancelled) {
                    workflow.on_cancel(&mut core).await;
                }
                core.finish(Terminal::from_error(&err), workflow.success_message());
                Err(err)
            }
        }
    }
}
