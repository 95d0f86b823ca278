//! Error types for the Squawker responder.

use thiserror::Error;

/// Main error type for Squawker operations.
#[derive(Error, Debug)]
pub enum SquawkerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// An `ignored_nicks` pattern failed to compile
    #[error("Invalid nick pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Squawker operations.
pub type Result<T> = std::result::Result<T, SquawkerError>;
