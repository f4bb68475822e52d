use std::time::Duration;

use tokio::time::timeout;

use crate::app::SettingsConsole;
use crate::pairing::PairingKind;

/// Upper bound on waiting for one session's cleanup.
const SESSION_DRAIN: Duration = Duration::from_secs(2);

pub async fn graceful_shutdown(console: &SettingsConsole) {
    tracing::info!("Shutdown sequence started");

    let pairing = console.pairing();
    pairing.cancel_all();
    tracing::info!("Shutdown: pairing sessions cancelled");

    for kind in PairingKind::ALL {
        let Some(handle) = pairing.session(kind) else {
            continue;
        };
        if timeout(SESSION_DRAIN, handle.finished()).await.is_err() {
            tracing::warn!(%kind, "Shutdown: session did not finish cleanup in time");
        }
    }

    tracing::info!("Shutdown sequence completed");
}
