use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::session::{Flow, Prompt, SessionCore, SessionInput, SessionState, Terminal, Workflow};
use super::PairingContext;
use crate::error::{CoreError, Result};

const TRAKT_TOGGLE: &str = "trakt.enabled";

/// Trakt device-code style linking: the operator authorizes in a popup and
/// pastes back the one-time code it shows.
pub(crate) struct TraktCodeFlow {
    ctx: Arc<PairingContext>,
}

impl TraktCodeFlow {
    pub fn new(ctx: Arc<PairingContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Workflow for TraktCodeFlow {
    async fn begin(&mut self, core: &mut SessionCore) -> Result<Flow> {
        self.ctx.ensure_editable(&[TRAKT_TOGGLE]).await?;

        let status = self
            .ctx
            .backend
            .trakt_status()
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to check Trakt status"))?;
        if status.env_controlled {
            return Err(CoreError::override_conflict(TRAKT_TOGGLE));
        }
        if status.connected {
            return Err(CoreError::Validation(
                "Trakt is already connected. Disconnect it first".to_string(),
            ));
        }

        let auth_url = self
            .ctx
            .backend
            .trakt_authorize()
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to start Trakt authorization"))?;
        let window = self
            .ctx
            .windows
            .open(&auth_url)
            .ok_or(CoreError::PopupBlocked)?;
        core.attach_window(window);

        core.set_state(
            SessionState::AwaitingUserAction(Prompt::EnterCode { auth_url }),
            true,
        );
        Ok(Flow::Continue)
    }

    async fn on_input(&mut self, core: &mut SessionCore, input: SessionInput) -> Flow {
        let SessionInput::Code(code) = input else {
            tracing::warn!(?input, "Trakt session expects an authorization code");
            return Flow::Continue;
        };
        let code = code.trim();
        if code.is_empty() {
            core.notifier().error("Please enter the authorization code");
            return Flow::Continue;
        }

        core.set_input_enabled(false);
        if let Err(e) = self.ctx.backend.trakt_exchange_code(code).await {
            tracing::warn!(error = %e, "Trakt code exchange failed");
            return Flow::Done(Terminal::Failure(e.message_or("Failed to connect to Trakt")));
        }

        Flow::Persist(vec![(TRAKT_TOGGLE, Value::Bool(true))])
    }

    fn success_message(&self) -> &'static str {
        "Successfully connected to Trakt"
    }
}
