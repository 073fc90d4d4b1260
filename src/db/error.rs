// src/db/error.rs

use thiserror::Error;

/// Errors surfaced by the profile and schedule stores.
///
/// None of them are retried; each one ends the user action that caused it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field is empty or a value is out of range. Nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The engine refused the statement (CHECK, FOREIGN KEY, I/O...).
    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored value could not be decoded into its domain type.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Persistence(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
