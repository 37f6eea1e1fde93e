//! Error types for abook-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for audiobook organization
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Failed to scan {path}: {message}")]
    Scan { path: PathBuf, message: String },

    #[error("Failed to extract metadata from {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    #[error("Failed to parse override file {path}: {message}")]
    OverrideParse { path: PathBuf, message: String },

    #[error("{} units resolve to the same target {target}", sources.len())]
    PathCollision {
        target: PathBuf,
        sources: Vec<PathBuf>,
    },

    #[error("{operation} is not supported here: {reason}")]
    UnsupportedOperation { operation: String, reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error only affects a single unit and the batch can continue
    pub fn is_unit_scoped(&self) -> bool {
        !matches!(self, Self::PathCollision { .. } | Self::Cancelled)
    }
}

/// Result type alias for abook operations
pub type Result<T> = std::result::Result<T, Error>;
