//! Backend REST API client.
//!
//! One trait per backend concern, all implemented by [`BackendClient`].
//! Non-2xx responses surface as [`ClientError::Api`](crate::ClientError)
//! carrying the server's `message`/`error` field when present.

mod appletv;
mod jellyfin;
mod lgtv;
mod plex;
mod request;
mod settings;
mod trakt;

pub mod models;

pub use appletv::AppleTvApi;
pub use jellyfin::JellyfinApi;
pub use lgtv::LgTvApi;
pub use plex::PlexApi;
pub use settings::SettingsApi;
pub use trakt::TraktApi;

use std::time::Duration;

use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    pub(super) http: reqwest::Client,
    pub(super) base: Url,
}

/// Every backend concern the settings console talks to.
pub trait Backend: SettingsApi + TraktApi + PlexApi + JellyfinApi + AppleTvApi + LgTvApi {}

impl<T> Backend for T where T: SettingsApi + TraktApi + PlexApi + JellyfinApi + AppleTvApi + LgTvApi
{}
