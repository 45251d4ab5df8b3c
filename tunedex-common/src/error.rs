//! Common error types for tunedex

use thiserror::Error;

/// Common result type for tunedex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the tunedex workspace
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or non-success response from the catalog service
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed or missing song fields, rejected before any state change
    #[error("Validation error: {0}")]
    Validation(String),

    /// Song absent from every source (canonical state, cache, remote)
    #[error("Song not found: {0}")]
    NotFound(i64),

    /// Remote lookup itself failed; distinct from the song being absent
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Local cache read/write failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Malformed payload from the catalog service
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
