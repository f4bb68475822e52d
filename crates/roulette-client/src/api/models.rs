//! Request and response shapes of the backend REST surface.

use serde::{Deserialize, Serialize};
use settings_tree::{ConfigTree, OverrideTree};

/// Full settings snapshot from `GET /api/settings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsSnapshot {
    pub settings: ConfigTree,
    #[serde(default)]
    pub env_overrides: OverrideTree,
}

/// Trakt connection status from `GET /trakt/status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraktStatus {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub env_controlled: bool,
    #[serde(default)]
    pub enabled: bool,
}

/// Outcome of `GET /trakt/disconnect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraktDisconnect {
    Disconnected,
    /// Tokens come from the environment and cannot be removed.
    EnvControlled,
}

/// A discovered Apple TV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppleTvDevice {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Stored-credential check for an Apple TV.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CredentialCheck {
    #[serde(default)]
    pub has_credentials: bool,
}

/// Backend answer to a pairing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingReply {
    Success,
    /// The device shows a PIN and waits for it; may repeat across rounds.
    AwaitingPin,
}

/// A discovered LG TV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LgTvDevice {
    pub ip: String,
    pub mac: String,
}

/// Plex PIN challenge from `POST /api/plex/get_token`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlexPin {
    pub auth_url: String,
    #[serde(deserialize_with = "string_or_number")]
    pub pin: String,
    pub client_id: String,
}

/// Jellyfin credentials from `POST /api/jellyfin/auth`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JellyfinAuth {
    pub api_key: String,
    pub user_id: String,
}

// ---------------------------------------------------------------------------
// Internal wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct AuthorizeResponse {
    pub auth_url: String,
}

/// `POST /api/jellyfin/auth` answers `{api_key, user_id}` or `{error}`,
/// sometimes with a 2xx status.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum JellyfinAuthReply {
    Authenticated(JellyfinAuth),
    Refused { error: String },
}

/// Generic `{status, error, message}` envelope.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusEnvelope {
    pub fn reason(&self) -> Option<String> {
        self.error.clone().or_else(|| self.message.clone())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceList<T> {
    #[serde(default = "Vec::new")]
    pub devices: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlexAuthCheck {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LibraryList {
    #[serde(default)]
    pub libraries: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserList {
    #[serde(default)]
    pub users: Vec<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
