mod config;

pub use config::{Config, ModelsConfig, ServerConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/switchwise[-dev]/` based on SWITCHWISE_ENV.
///
/// Set SWITCHWISE_ENV=dev to use the development data directory, or
/// SWITCHWISE_HOME to point at an explicit directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("SWITCHWISE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SWITCHWISE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("switchwise-dev")
            } else {
                base_dir.join("switchwise")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
