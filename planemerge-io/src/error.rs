//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur while reading frames and configuration or writing results
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Write error: {message}")]
    WriteError { message: String },

    #[error(transparent)]
    Data(#[from] planemerge_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for I/O operations
pub type IoResult<T> = std::result::Result<T, IoError>;
