//! Error types for the serving layer

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Invalid odds: {0}")]
    InvalidOdds(String),

    #[error("Unsupported odds format: {0}")]
    UnsupportedFormat(String),

    #[error("Model probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("Stake must be a positive finite number, got {0}")]
    InvalidStake(f64),

    #[error("Edge threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Feature dimension mismatch: model expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServeError {
    /// Errors caused by a caller violating the input contract
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServeError::InvalidOdds(_)
                | ServeError::UnsupportedFormat(_)
                | ServeError::InvalidProbability(_)
                | ServeError::InvalidStake(_)
                | ServeError::InvalidThreshold(_)
        )
    }
}

impl From<::config::ConfigError> for ServeError {
    fn from(e: ::config::ConfigError) -> Self {
        ServeError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServeError>;
