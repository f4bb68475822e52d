//! Error taxonomy for settings edits and pairing workflows.

use roulette_client::ClientError;
use settings_tree::TreeError;

use crate::pairing::PairingKind;

/// Every failure an operator action can end in.
///
/// All variants are caught at the boundary of the triggering action and
/// turned into a notification; none end the page session.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{path} is controlled by an environment variable")]
    OverrideConflict { path: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Transport(String),

    #[error("Popup blocked. Allow popups for this page and try again")]
    PopupBlocked,

    #[error("Timed out waiting for authorization")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,

    #[error("A {0} session is already in progress")]
    SessionActive(PairingKind),

    #[error("Invalid settings path: {0}")]
    Tree(#[from] TreeError),
}

impl CoreError {
    /// Map a backend failure, preferring the server's message over `fallback`.
    pub fn transport(err: &ClientError, fallback: &str) -> Self {
        tracing::debug!(error = %err, "backend call failed");
        Self::Transport(err.message_or(fallback))
    }

    pub fn override_conflict(path: &str) -> Self {
        Self::OverrideConflict {
            path: path.to_string(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
