//! Error types for planemerge

use thiserror::Error;

/// Main error type for planemerge operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),
    
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for planemerge operations
pub type Result<T> = std::result::Result<T, Error>;
