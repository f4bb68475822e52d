use async_trait::async_trait;

use super::BackendClient;
use super::models::{DeviceList, LgTvDevice};
use crate::Result;

/// LG TV network discovery and validation.
#[async_trait]
pub trait LgTvApi: Send + Sync {
    async fn lgtv_scan(&self) -> Result<Vec<LgTvDevice>>;

    /// Ask the backend whether `ip`/`mac` address a reachable LG TV.
    async fn lgtv_validate(&self, ip: &str, mac: &str) -> Result<()>;
}

#[async_trait]
impl LgTvApi for BackendClient {
    async fn lgtv_scan(&self) -> Result<Vec<LgTvDevice>> {
        let resp: DeviceList<LgTvDevice> = self.get_json(&["api", "lgtv", "scan"]).await?;
        Ok(resp.devices)
    }

    async fn lgtv_validate(&self, ip: &str, mac: &str) -> Result<()> {
        self.get_ok(&["api", "lgtv", "validate"], &[("ip", ip), ("mac", mac)])
            .await
    }
}
