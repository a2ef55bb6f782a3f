//! Error types for the periplus namespace browser core
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.

use thiserror::Error;

/// Main error type for periplus operations
#[derive(Error, Debug)]
pub enum PeriplusError {
    /// Name could not be resolved or bound to any server address
    #[error("Name resolution failed: {0}")]
    Resolution(String),

    /// Streaming glob call failed mid-flight
    #[error("Glob stream error: {0}")]
    GlobStream(String),

    /// Remote signature could not be fetched
    #[error("Signature unavailable: {0}")]
    Signature(String),

    /// Remote method invocation failed
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Method missing from a service signature
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Name did not resolve to any namespace item
    #[error("Name not found: {0}")]
    NameNotFound(String),

    /// Key-value store operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Learner id registered twice
    #[error("Learner already registered: {0}")]
    LearnerExists(String),

    /// Learner id never registered
    #[error("Unknown learner: {0}")]
    UnknownLearner(String),

    /// Input or query does not match the learner kind
    #[error("Invalid learner input: {0}")]
    LearnerInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for periplus operations
pub type Result<T> = std::result::Result<T, PeriplusError>;

/// Convert anyhow::Error to PeriplusError
impl From<anyhow::Error> for PeriplusError {
    fn from(err: anyhow::Error) -> Self {
        PeriplusError::Other(err.to_string())
    }
}
