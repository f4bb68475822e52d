use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::mac::{format_mac_input, is_complete_mac};
use super::session::{Flow, Prompt, SessionCore, SessionInput, SessionState, Terminal, Workflow};
use super::PairingContext;
use crate::error::Result;

const LG_TV_IP: &str = "clients.lg_tv.ip";
const LG_TV_MAC: &str = "clients.lg_tv.mac";

/// LG TV discovery: scan the network, let the operator pick or type an
/// address, then have the backend confirm the TV answers.
pub(crate) struct LgTvScanFlow {
    ctx: Arc<PairingContext>,
}

impl LgTvScanFlow {
    pub fn new(ctx: Arc<PairingContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Workflow for LgTvScanFlow {
    async fn begin(&mut self, core: &mut SessionCore) -> Result<Flow> {
        self.ctx.ensure_editable(&[LG_TV_IP, LG_TV_MAC]).await?;

        let candidates = match self.ctx.backend.lgtv_scan().await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!(error = %e, "LG TV scan failed");
                Vec::new()
            }
        };
        tracing::info!(found = candidates.len(), "LG TV scan complete");
        if candidates.is_empty() {
            core.notifier()
                .info("No LG TVs found. Enter the IP and MAC address manually");
        }

        core.set_state(
            SessionState::AwaitingUserAction(Prompt::ChooseDevice { candidates }),
            true,
        );
        Ok(Flow::Continue)
    }

    async fn on_input(&mut self, core: &mut SessionCore, input: SessionInput) -> Flow {
        let SessionInput::Device { ip, mac } = input else {
            tracing::warn!(?input, "LG TV session expects a device");
            return Flow::Continue;
        };
        let ip = ip.trim();
        if ip.is_empty() || mac.trim().is_empty() {
            core.notifier()
                .error("Please enter both IP and MAC address");
            return Flow::Continue;
        }
        if ip.parse::<IpAddr>().is_err() {
            core.notifier().error(format!("'{ip}' is not a valid IP address"));
            return Flow::Continue;
        }
        let mac = format_mac_input(&mac);
        if !is_complete_mac(&mac) {
            core.notifier()
                .error("MAC address must contain 12 hex digits");
            return Flow::Continue;
        }

        core.set_input_enabled(false);
        if let Err(e) = self.ctx.backend.lgtv_validate(ip, &mac).await {
            tracing::warn!(ip, %mac, error = %e, "LG TV validation failed");
            return Flow::Done(Terminal::Failure(e.message_or("Failed to validate LG TV")));
        }
        Flow::Persist(vec![
            (LG_TV_IP, Value::String(ip.to_string())),
            (LG_TV_MAC, Value::String(mac)),
        ])
    }

    fn success_message(&self) -> &'static str {
        "LG TV configured successfully"
    }
}
