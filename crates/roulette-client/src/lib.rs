//! Movie Roulette backend client library.
//!
//! Typed async access to the settings, Trakt, Plex, Jellyfin, Apple TV and
//! LG TV endpoints of the backend REST surface. Each concern is a trait so
//! callers can depend on [`Backend`] and substitute fakes in tests.

pub mod api;

pub use api::models::{
    AppleTvDevice, CredentialCheck, JellyfinAuth, LgTvDevice, PairingReply, PlexPin,
    SettingsSnapshot, TraktDisconnect, TraktStatus,
};
pub use api::{
    AppleTvApi, Backend, BackendClient, JellyfinApi, LgTvApi, PlexApi, SettingsApi, TraktApi,
};

/// Unified error type for the roulette-client crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("{}", .message.as_deref().unwrap_or("backend request failed"))]
    Api { status: u16, message: Option<String> },

    #[error("{0}")]
    Rejected(String),
}

impl ClientError {
    /// The message supplied by the server, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            Self::Rejected(message) => Some(message),
            _ => None,
        }
    }

    /// The server's message, or `fallback` when it gave none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Result type alias for backend calls.
pub type Result<T> = std::result::Result<T, ClientError>;
