//! Error types for viewmesh

use thiserror::Error;

/// Main error type for viewmesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Simplification error: {0}")]
    Simplification(String),
}

/// Result type alias for viewmesh operations
pub type Result<T> = std::result::Result<T, Error>;
