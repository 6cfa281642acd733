//! @acp:module "Errors"
//! @acp:summary "Driver error types and result alias"
//! @acp:domain cli
//! @acp:layer types
//!
//! Error types for the driver library.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the driver before or outside provider invocation.
///
/// Provider failures are not errors in this sense: they travel as
/// [`Outcome::Failure`](crate::provider::Outcome::Failure).
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("invalid provider manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Malformed command line, carrying the parser's rendered message.
    #[error("{0}")]
    Usage(String),
}

impl From<clap::Error> for DriverError {
    fn from(err: clap::Error) -> Self {
        DriverError::Usage(err.render().to_string())
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
