use async_trait::async_trait;
use serde_json::json;

use super::BackendClient;
use super::models::{AppleTvDevice, CredentialCheck, DeviceList, PairingReply, StatusEnvelope};
use crate::{ClientError, Result};

/// Apple TV discovery and PIN pairing.
#[async_trait]
pub trait AppleTvApi: Send + Sync {
    async fn appletv_scan(&self) -> Result<Vec<AppleTvDevice>>;

    async fn appletv_check_credentials(&self, device_id: &str) -> Result<bool>;

    /// Begin pairing; the device normally answers by showing a PIN.
    async fn appletv_start_pairing(&self, device_id: &str) -> Result<PairingReply>;

    /// Submit the PIN shown on screen. The device may ask for another round.
    async fn appletv_submit_pin(&self, device_id: &str, pin: &str) -> Result<PairingReply>;

    /// Abort an in-progress pairing.
    async fn appletv_cancel(&self, device_id: &str) -> Result<()>;
}

#[async_trait]
impl AppleTvApi for BackendClient {
    async fn appletv_scan(&self) -> Result<Vec<AppleTvDevice>> {
        let resp: DeviceList<AppleTvDevice> = self.get_json(&["api", "appletv", "scan"]).await?;
        Ok(resp.devices)
    }

    async fn appletv_check_credentials(&self, device_id: &str) -> Result<bool> {
        let resp: CredentialCheck = self
            .post_json(
                &["api", "appletv", "check_credentials"],
                &json!({ "device_id": device_id }),
            )
            .await?;
        Ok(resp.has_credentials)
    }

    async fn appletv_start_pairing(&self, device_id: &str) -> Result<PairingReply> {
        let resp: StatusEnvelope = self.get_json(&["api", "appletv", "pair", device_id]).await?;
        pairing_reply(resp)
    }

    async fn appletv_submit_pin(&self, device_id: &str, pin: &str) -> Result<PairingReply> {
        let resp: StatusEnvelope = self
            .post_json(&["api", "appletv", "pin", device_id], &json!({ "pin": pin }))
            .await?;
        pairing_reply(resp)
    }

    async fn appletv_cancel(&self, device_id: &str) -> Result<()> {
        self.get_ok(&["api", "appletv", "cancel", device_id], &[])
            .await
    }
}

fn pairing_reply(resp: StatusEnvelope) -> Result<PairingReply> {
    match resp.status.as_deref() {
        Some("success") => Ok(PairingReply::Success),
        Some("awaiting_pin") => Ok(PairingReply::AwaitingPin),
        _ => Err(ClientError::Rejected(
            resp.reason()
                .unwrap_or_else(|| "Unexpected pairing response".into()),
        )),
    }
}
