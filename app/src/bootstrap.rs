use crate::config::AppConfig;

/// Load `.env` and the console configuration (fatal on error).
pub fn init_foundation() -> Result<AppConfig, anyhow::Error> {
    match load_env_file(&ENV_FILES) {
        Some(path) => tracing::info!(path, "Loaded .env"),
        None => tracing::info!("No .env file found, using the process environment"),
    }
    let config = AppConfig::load()?;
    tracing::info!(
        backend = %config.backend_url,
        timeout_secs = config.http_timeout.as_secs(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Where a `.env` may sit relative to the working directory, nearest first.
const ENV_FILES: [&str; 3] = [".env", "../.env", "../../.env"];

/// Load the first readable file of `candidates` into the process
/// environment. Variables the process already has are kept.
fn load_env_file(candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .copied()
        .find(|path| dotenvy::from_filename(path).is_ok())
}
