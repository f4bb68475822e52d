//! Configuration value validation.

use url::Url;

use super::{BACKEND_URL, HTTP_TIMEOUT_SECS, PLEX_MAX_ATTEMPTS, PLEX_POLL_INTERVAL_MS};

/// Validate a configuration value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        BACKEND_URL => {
            let url = Url::parse(value).map_err(|e| format!("must be a URL ({e})"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err("must be an http or https URL".into());
            }
        }
        HTTP_TIMEOUT_SECS => validate_int_range(value, 1, 300)?,
        PLEX_POLL_INTERVAL_MS => validate_int_range(value, 250, 60_000)?,
        PLEX_MAX_ATTEMPTS => validate_int_range(value, 1, 1000)?,
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: u64, max: u64) -> Result<(), String> {
    let v: u64 = value.parse().map_err(|_| "must be a non-negative integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
