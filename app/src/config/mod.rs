//! Console configuration: defaults, validation, loading from the environment.
//!
//! This is the console's own runtime configuration. The managed settings
//! tree lives in [`crate::store`].

pub mod app_config;
pub mod validation;

pub use app_config::AppConfig;

pub const BACKEND_URL: &str = "ROULETTE_BACKEND_URL";
pub const HTTP_TIMEOUT_SECS: &str = "ROULETTE_HTTP_TIMEOUT_SECS";
pub const PLEX_POLL_INTERVAL_MS: &str = "ROULETTE_PLEX_POLL_INTERVAL_MS";
pub const PLEX_MAX_ATTEMPTS: &str = "ROULETTE_PLEX_MAX_ATTEMPTS";
