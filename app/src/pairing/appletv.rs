use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use roulette_client::PairingReply;
use serde_json::Value;

use super::session::{Flow, Prompt, SessionCore, SessionInput, SessionState, Terminal, Workflow};
use super::PairingContext;
use crate::error::{CoreError, Result};

static RE_PIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}$").unwrap());

const APPLE_TV_ID: &str = "clients.apple_tv.id";
const APPLE_TV_TOGGLE: &str = "clients.apple_tv.enabled";

/// Apple TV PIN pairing. The device may ask for any number of PIN rounds;
/// the backend decides when pairing is complete.
pub(crate) struct AppleTvPinFlow {
    ctx: Arc<PairingContext>,
    device_id: String,
    round: u32,
}

impl AppleTvPinFlow {
    pub fn new(ctx: Arc<PairingContext>, device_id: String) -> Self {
        Self {
            ctx,
            device_id: device_id.trim().to_string(),
            round: 0,
        }
    }

    fn prompt_pin(&mut self, core: &mut SessionCore) {
        self.round += 1;
        core.set_state(
            SessionState::AwaitingUserAction(Prompt::EnterPin {
                device_id: self.device_id.clone(),
                round: self.round,
            }),
            true,
        );
    }

    fn paired(&self) -> Flow {
        Flow::Persist(vec![
            (APPLE_TV_ID, Value::String(self.device_id.clone())),
            (APPLE_TV_TOGGLE, Value::Bool(true)),
        ])
    }
}

#[async_trait]
impl Workflow for AppleTvPinFlow {
    async fn begin(&mut self, core: &mut SessionCore) -> Result<Flow> {
        if self.device_id.is_empty() {
            return Err(CoreError::Validation(
                "Please select or enter an Apple TV".to_string(),
            ));
        }
        self.ctx
            .ensure_editable(&[APPLE_TV_ID, APPLE_TV_TOGGLE])
            .await?;

        let backend = &self.ctx.backend;
        let paired = backend
            .appletv_check_credentials(&self.device_id)
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to check Apple TV credentials"))?;
        if paired {
            tracing::info!(device_id = %self.device_id, "Apple TV already paired");
            return Ok(self.paired());
        }

        let reply = backend
            .appletv_start_pairing(&self.device_id)
            .await
            .map_err(|e| CoreError::transport(&e, "Failed to start pairing"))?;
        match reply {
            PairingReply::AwaitingPin => {
                self.prompt_pin(core);
                Ok(Flow::Continue)
            }
            PairingReply::Success => Ok(self.paired()),
        }
    }

    async fn on_input(&mut self, core: &mut SessionCore, input: SessionInput) -> Flow {
        let SessionInput::Pin(pin) = input else {
            tracing::warn!(?input, "Apple TV session expects a PIN");
            return Flow::Continue;
        };
        let pin = pin.trim();
        if !RE_PIN.is_match(pin) {
            core.notifier()
                .error("Please enter the 4-digit PIN shown on your Apple TV");
            return Flow::Continue;
        }

        core.set_input_enabled(false);
        match self.ctx.backend.appletv_submit_pin(&self.device_id, pin).await {
            Ok(PairingReply::Success) => self.paired(),
            Ok(PairingReply::AwaitingPin) => {
                tracing::info!(round = self.round, "Apple TV requested another PIN");
                self.prompt_pin(core);
                core.notifier()
                    .info("Enter the new PIN shown on your Apple TV");
                Flow::Continue
            }
            Err(e) => Flow::Done(Terminal::Failure(e.message_or("Failed to pair with Apple TV"))),
        }
    }

    async fn on_cancel(&mut self, _core: &mut SessionCore) {
        if self.device_id.is_empty() {
            return;
        }
        if let Err(e) = self.ctx.backend.appletv_cancel(&self.device_id).await {
            tracing::warn!(device_id = %self.device_id, error = %e, "Failed to cancel Apple TV pairing");
        }
    }

    fn success_message(&self) -> &'static str {
        "Apple TV paired successfully"
    }
}
