//! Runtime console configuration loaded from the environment.

use std::time::Duration;

use anyhow::anyhow;

use super::validation::validate_setting;
use super::{BACKEND_URL, HTTP_TIMEOUT_SECS, PLEX_MAX_ATTEMPTS, PLEX_POLL_INTERVAL_MS};
use crate::pairing::PollSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend_url: String,
    pub http_timeout: Duration,
    pub plex_poll: PollSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:4000".into(),
            http_timeout: Duration::from_secs(15),
            plex_poll: PollSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`. Unset or blank variables keep
    /// their defaults; invalid ones are an error naming the variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> Result<Option<String>, anyhow::Error> {
            let Some(value) = lookup(key).map(|v| v.trim().to_string()) else {
                return Ok(None);
            };
            if value.is_empty() {
                return Ok(None);
            }
            validate_setting(key, &value).map_err(|reason| anyhow!("{key} {reason}"))?;
            Ok(Some(value))
        };

        let defaults = Self::default();
        let backend_url = g(BACKEND_URL)?.unwrap_or(defaults.backend_url);
        let http_timeout = g(HTTP_TIMEOUT_SECS)?
            .map(|v| Duration::from_secs(parse_u64(&v, 15)))
            .unwrap_or(defaults.http_timeout);
        let interval = g(PLEX_POLL_INTERVAL_MS)?
            .map(|v| Duration::from_millis(parse_u64(&v, 2000)))
            .unwrap_or(defaults.plex_poll.interval);
        let max_attempts = g(PLEX_MAX_ATTEMPTS)?
            .map(|v| parse_u32(&v, 60))
            .unwrap_or(defaults.plex_poll.max_attempts);

        Ok(Self {
            backend_url,
            http_timeout,
            plex_poll: PollSettings {
                interval,
                max_attempts,
            },
        })
    }
}

fn parse_u64(s: &str, default: u64) -> u64 {
    s.parse().unwrap_or(default)
}

fn parse_u32(s: &str, default: u32) -> u32 {
    s.parse().unwrap_or(default)
}
