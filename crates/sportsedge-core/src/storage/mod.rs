mod config;
pub mod usage_db;

pub use config::{AccessConfig, ApiConfig, Config, NotificationsConfig, RewardsConfig};
pub use usage_db::UsageStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/sportsedge[-dev]/` based on SPORTSEDGE_ENV.
///
/// Set SPORTSEDGE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SPORTSEDGE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("sportsedge-dev")
    } else {
        base_dir.join("sportsedge")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
