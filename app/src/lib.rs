//! Settings reconciliation and device pairing for the Movie Roulette
//! settings page.
//!
//! The store mirrors the backend's settings tree and environment overrides,
//! the submitter pushes single-field edits, and the pairing manager drives
//! the Trakt, Plex, Apple TV and LG TV linking workflows.

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod integrations;
pub mod notify;
pub mod pairing;
pub mod shutdown;
pub mod store;
pub mod submit;

#[cfg(test)]
mod testing;

pub use app::SettingsConsole;
pub use bootstrap::init_foundation;
pub use error::CoreError;
