use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::session::{Flow, SessionCore, SessionInput, SessionState, Terminal, Workflow};
use super::PairingContext;
use crate::error::{CoreError, Result};

const PLEX_TOKEN: &str = "plex.token";

/// Plex PIN linking: the operator approves a PIN in a popup while the
/// session polls the backend for the resulting token.
pub(crate) struct PlexPinFlow {
    ctx: Arc<PairingContext>,
    client_id: String,
}

impl PlexPinFlow {
    pub fn new(ctx: Arc<PairingContext>) -> Self {
        Self {
            ctx,
            client_id: String::new(),
        }
    }
}

#[async_trait]
impl Workflow for PlexPinFlow {
    async fn begin(&mut self, core: &mut SessionCore) -> Result<Flow> {
        self.ctx.ensure_editable(&[PLEX_TOKEN]).await?;

        let challenge = self
            .ctx
            .backend
            .plex_request_pin()
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to start Plex authorization"))?;
        let window = self
            .ctx
            .windows
            .open(&challenge.auth_url)
            .ok_or(CoreError::PopupBlocked)?;
        core.attach_window(window);

        let poll = self.ctx.plex_poll;
        core.configure_polling(poll.interval, poll.max_attempts);
        self.client_id = challenge.client_id;
        core.set_state(
            SessionState::Polling {
                pin: challenge.pin,
                auth_url: challenge.auth_url,
            },
            false,
        );
        Ok(Flow::Continue)
    }

    async fn on_input(&mut self, _core: &mut SessionCore, input: SessionInput) -> Flow {
        tracing::warn!(?input, "Plex session takes no input");
        Flow::Continue
    }

    async fn on_tick(&mut self, core: &mut SessionCore) -> Flow {
        if core.window_closed() {
            tracing::info!("Plex authorization window closed before approval");
            return Flow::Done(Terminal::Cancelled);
        }

        let attempt = core.record_attempt();
        match self.ctx.backend.plex_check_auth(&self.client_id).await {
            Ok(Some(token)) => {
                tracing::info!(attempt, "Plex authorization approved");
                return Flow::Persist(vec![(PLEX_TOKEN, Value::String(token))]);
            }
            Ok(None) => tracing::debug!(attempt, "Plex authorization pending"),
            Err(e) => tracing::warn!(attempt, error = %e, "Plex authorization check failed"),
        }

        if core.attempt_limit().is_some_and(|limit| attempt >= limit) {
            return Flow::Done(Terminal::Timeout);
        }
        Flow::Continue
    }

    fn success_message(&self) -> &'static str {
        "Successfully connected to Plex"
    }
}
