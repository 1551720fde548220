//! Error types for cave map generation

use std::fmt;

/// Errors that can occur during map generation or queries
#[derive(Debug, Clone)]
pub enum CaveError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// An operation received input it cannot work with
    InvalidInput(String),
}

impl fmt::Display for CaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaveError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            CaveError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for CaveError {}

/// Result type alias for cave generation operations
pub type Result<T> = std::result::Result<T, CaveError>;
