//! Error types for the device gate

use std::io;

use thiserror::Error;

/// Result type alias for the device gate
pub type Result<T> = std::result::Result<T, Error>;

/// Device gate errors
///
/// These cover startup and tooling failures only. A rejected call is never
/// an [`Error`]; it is a [`tonic::Status`] built by
/// [`RejectionError`](crate::gate::RejectionError).
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shared secret could not be used
    #[error("Secret error: {0}")]
    Secret(#[from] gate_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
