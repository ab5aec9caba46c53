//! Error types for the order-insights pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for pipeline operations.
///
/// Every variant is fatal to the current run: the runner stops at the first
/// error and never hands back a partial result map.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Unknown catalog identifier.
    #[error("Query not found: '{0}'")]
    NotFound(String),

    /// The SQL resource backing a catalog entry does not exist.
    #[error("SQL resource not found: {}", path.display())]
    ResourceNotFound { path: PathBuf },

    /// Statement failure, or a row that breaks a transform invariant.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a missing resource error.
    pub fn resource_missing(path: impl Into<PathBuf>) -> Self {
        Self::ResourceNotFound { path: path.into() }
    }
}

/// Result type alias for pipeline operations.
pub type EtlResult<T> = Result<T, EtlError>;
