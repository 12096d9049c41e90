//! Error types for the Gnotus client

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Document absent or access denied (indistinguishable by design)
    #[error("Document not found")]
    NotFound,

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a status the contract does not allow
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),
}
