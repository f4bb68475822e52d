//! Pairing session state, handles and the driving loop.

use std::time::Duration;

use async_trait::async_trait;
use roulette_client::LgTvDevice;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::window::ExternalWindow;
use super::PairingKind;
use crate::error::{CoreError, Result};
use crate::notify::Notifier;
use crate::submit::ChangeSubmitter;

const INPUT_BUFFER: usize = 8;

/// What the operator is being asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Paste the one-time code shown at `auth_url`.
    EnterCode { auth_url: String },
    /// Type the PIN the device is showing. `round` starts at 1.
    EnterPin { device_id: String, round: u32 },
    /// Pick one of the discovered devices or enter one manually.
    ChooseDevice { candidates: Vec<LgTvDevice> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Init,
    AwaitingUserAction(Prompt),
    /// Waiting for the operator to approve `pin` at `auth_url`.
    Polling { pin: String, auth_url: String },
    Success,
    Failure(String),
    Timeout,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failure(_) | Self::Timeout | Self::Cancelled
        )
    }
}

/// Everything the presentation layer renders for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub kind: PairingKind,
    pub state: SessionState,
    pub attempts: u32,
    pub attempt_limit: Option<u32>,
    pub poll_interval: Option<Duration>,
    /// Whether the operator may submit input right now.
    pub input_enabled: bool,
}

/// Operator input routed into a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Code(String),
    Pin(String),
    Device { ip: String, mac: String },
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Terminal {
    Success,
    Failure(String),
    Timeout,
    Cancelled,
}

impl Terminal {
    pub fn from_error(err: &CoreError) -> Self {
        match err {
            CoreError::Timeout => Self::Timeout,
            CoreError::Cancelled => Self::Cancelled,
            other => Self::Failure(other.to_string()),
        }
    }

    fn state(&self) -> SessionState {
        match self {
            Self::Success => SessionState::Success,
            Self::Failure(reason) => SessionState::Failure(reason.clone()),
            Self::Timeout => SessionState::Timeout,
            Self::Cancelled => SessionState::Cancelled,
        }
    }
}

pub(crate) enum Flow {
    Continue,
    /// The pairing went through; store these values, then succeed.
    Persist(Vec<(&'static str, Value)>),
    Done(Terminal),
}

/// One pairing protocol.
#[async_trait]
pub(crate) trait Workflow: Send + 'static {
    /// Runs until the session first needs the operator. An error ends the
    /// session before it becomes interactive.
    async fn begin(&mut self, core: &mut SessionCore) -> Result<Flow>;

    async fn on_input(&mut self, core: &mut SessionCore, input: SessionInput) -> Flow;

    /// Called every poll interval, if the workflow configured one.
    async fn on_tick(&mut self, _core: &mut SessionCore) -> Flow {
        Flow::Continue
    }

    /// Best-effort cleanup when the operator cancels.
    async fn on_cancel(&mut self, _core: &mut SessionCore) {}

    fn success_message(&self) -> &'static str;
}

/// Control side of a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    kind: PairingKind,
    inputs: mpsc::Sender<SessionInput>,
    updates: watch::Receiver<SessionSnapshot>,
    cancel: CancellationToken,
}

impl SessionHandle {
    pub fn kind(&self) -> PairingKind {
        self.kind
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.updates.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        !self.updates.borrow().state.is_terminal()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.clone()
    }

    /// Route operator input into the session.
    pub async fn send(&self, input: SessionInput) -> Result<()> {
        let inactive = || CoreError::Validation(format!("No {} session is in progress", self.kind));
        if !self.is_active() {
            return Err(inactive());
        }
        self.inputs.send(input).await.map_err(|_| inactive())
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the snapshot satisfies `pred`, or the session is gone.
    pub async fn wait_for(&self, pred: impl FnMut(&SessionSnapshot) -> bool) -> SessionSnapshot {
        let mut rx = self.updates.clone();
        if let Ok(snapshot) = rx.wait_for(pred).await {
            return (*snapshot).clone();
        }
        rx.borrow().clone()
    }

    pub async fn finished(&self) -> SessionSnapshot {
        self.wait_for(|s| s.state.is_terminal()).await
    }
}

/// Session side: owns the window and publishes every transition.
pub(crate) struct SessionCore {
    kind: PairingKind,
    updates: watch::Sender<SessionSnapshot>,
    cancel: CancellationToken,
    notifier: Notifier,
    window: Option<Box<dyn ExternalWindow>>,
    finished: bool,
}

/// Create the channels of a new session in the `Init` state.
pub(crate) fn open(
    kind: PairingKind,
    notifier: Notifier,
) -> (SessionCore, SessionHandle, mpsc::Receiver<SessionInput>) {
    let (updates_tx, updates_rx) = watch::channel(SessionSnapshot {
        kind,
        state: SessionState::Init,
        attempts: 0,
        attempt_limit: None,
        poll_interval: None,
        input_enabled: false,
    });
    let (inputs_tx, inputs_rx) = mpsc::channel(INPUT_BUFFER);
    let cancel = CancellationToken::new();

    let core = SessionCore {
        kind,
        updates: updates_tx,
        cancel: cancel.clone(),
        notifier,
        window: None,
        finished: false,
    };
    let handle = SessionHandle {
        kind,
        inputs: inputs_tx,
        updates: updates_rx,
        cancel,
    };
    (core, handle, inputs_rx)
}

impl SessionCore {
    pub fn kind(&self) -> PairingKind {
        self.kind
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn set_state(&mut self, state: SessionState, input_enabled: bool) {
        if self.finished {
            tracing::warn!(kind = %self.kind, ?state, "Ignoring transition after session ended");
            return;
        }
        tracing::debug!(kind = %self.kind, ?state, "Pairing session transition");
        self.updates.send_modify(|s| {
            s.state = state;
            s.input_enabled = input_enabled;
        });
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        if !self.finished {
            self.updates.send_modify(|s| s.input_enabled = enabled);
        }
    }

    pub fn configure_polling(&mut self, interval: Duration, limit: u32) {
        self.updates.send_modify(|s| {
            s.poll_interval = Some(interval);
            s.attempt_limit = Some(limit);
            s.attempts = 0;
        });
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.updates.borrow().poll_interval
    }

    /// Count one poll attempt and return the new total.
    pub fn record_attempt(&mut self) -> u32 {
        self.updates.send_modify(|s| s.attempts += 1);
        self.updates.borrow().attempts
    }

    pub fn attempt_limit(&self) -> Option<u32> {
        self.updates.borrow().attempt_limit
    }

    pub fn attach_window(&mut self, window: Box<dyn ExternalWindow>) {
        self.window = Some(window);
    }

    /// Whether an attached window has been closed.
    pub fn window_closed(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.is_closed())
    }

    fn release_window(&mut self) {
        if let Some(mut window) = self.window.take() {
            if !window.is_closed() {
                window.close();
            }
        }
    }

    /// Enter a terminal state and tell the operator about it.
    pub fn finish(mut self, terminal: Terminal, success_message: &str) {
        self.release_window();
        match &terminal {
            Terminal::Success => self.notifier.success(success_message),
            Terminal::Failure(reason) => self.notifier.error(reason.clone()),
            Terminal::Timeout => self.notifier.error(CoreError::Timeout.to_string()),
            Terminal::Cancelled => self.notifier.info(format!("{} cancelled", self.kind)),
        }
        let state = terminal.state();
        tracing::info!(kind = %self.kind, ?state, "Pairing session ended");
        self.updates.send_modify(|s| {
            s.state = state;
            s.input_enabled = false;
        });
        self.finished = true;
    }
}

impl Drop for SessionCore {
    fn drop(&mut self) {
        self.release_window();
        if !self.finished {
            self.finished = true;
            self.updates.send_modify(|s| {
                s.state = SessionState::Cancelled;
                s.input_enabled = false;
            });
        }
    }
}

enum Trigger {
    Cancel,
    Input(SessionInput),
    Tick,
}

/// Run a begun session until it reaches a terminal state.
///
/// Cancellation also interrupts a step that is still waiting on the backend.
pub(crate) async fn drive<W: Workflow>(
    mut workflow: W,
    mut core: SessionCore,
    mut inputs: mpsc::Receiver<SessionInput>,
    submitter: ChangeSubmitter,
) {
    let cancel = core.cancel_token();
    let mut ticker = core.poll_interval().map(|period| {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    let terminal = loop {
        let trigger = tokio::select! {
            biased;
            () = cancel.cancelled() => Trigger::Cancel,
            input = inputs.recv() => input.map_or(Trigger::Cancel, Trigger::Input),
            () = next_tick(&mut ticker) => Trigger::Tick,
        };

        let flow = match trigger {
            Trigger::Cancel => None,
            Trigger::Input(input) => {
                interruptible(&cancel, workflow.on_input(&mut core, input)).await
            }
            Trigger::Tick => interruptible(&cancel, workflow.on_tick(&mut core)).await,
        };

        match flow {
            Some(Flow::Continue) => {}
            Some(Flow::Persist(writes)) => {
                break match persist(&submitter, writes).await {
                    Ok(()) => Terminal::Success,
                    Err(e) => Terminal::from_error(&e),
                };
            }
            Some(Flow::Done(terminal)) => break terminal,
            None => {
                workflow.on_cancel(&mut core).await;
                break Terminal::Cancelled;
            }
        }
    };

    core.finish(terminal, workflow.success_message());
}

/// Store the outcome of a completed pairing.
///
/// Never raced against cancellation: every write the backend accepts is
/// committed to the local tree.
pub(crate) async fn persist(
    submitter: &ChangeSubmitter,
    writes: Vec<(&'static str, Value)>,
) -> Result<()> {
    for (path, value) in writes {
        submitter.submit(path, value).await.inspect_err(|e| {
            tracing::warn!(path, error = %e, "Failed to store pairing result");
        })?;
    }
    Ok(())
}

/// `None` when the session was cancelled before `step` completed.
pub(crate) async fn interruptible<T>(
    cancel: &CancellationToken,
    step: impl Future<Output = T>,
) -> Option<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        out = step => Some(out),
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
