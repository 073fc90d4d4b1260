// src/config.rs

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DB_PATH_VAR: &str = "PIM_DB_PATH";
pub const USER_ID_VAR: &str = "PIM_USER_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Runtime settings. Logging is configured separately through `RUST_LOG`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: PathBuf,
    /// The single user this process manages.
    pub user_id: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("personal_management.db"),
            user_id: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(DB_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(USER_ID_VAR) {
            config.user_id = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: USER_ID_VAR,
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}
