mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, FormsConfig, ListConfig, WatchConfig};
pub use database::MilestoneDb;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `MILESTONES_DATA_DIR` wins when set. Otherwise `~/.config/milestones[-dev]/`
/// based on MILESTONES_ENV (set MILESTONES_ENV=dev for a development copy).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MILESTONES_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MILESTONES_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("milestones-dev")
            } else {
                base_dir.join("milestones")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
