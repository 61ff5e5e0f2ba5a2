//! Error types for the recordseek library.
//!
//! Matching, scoring, faceting and highlighting never fail: malformed input
//! degrades to broader or narrower matches instead. Errors only surface from
//! the edges of the crate, namely corpus loading, configuration and the CLI.
//!
//! # Examples
//!
//! ```
//! use recordseek::error::{RecordSeekError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(RecordSeekError::corpus("records array is missing"))
//! }
//!
//! match load() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for recordseek operations.
#[derive(Error, Debug)]
pub enum RecordSeekError {
    /// I/O errors (reading corpus or config files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Corpus-related errors (unexpected shape, duplicate ids, ...).
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Configuration values that cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid argument supplied by a caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with RecordSeekError.
pub type Result<T> = std::result::Result<T, RecordSeekError>;

impl RecordSeekError {
    /// Create a new corpus error.
    pub fn corpus<S: Into<String>>(msg: S) -> Self {
        RecordSeekError::Corpus(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        RecordSeekError::InvalidConfig(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        RecordSeekError::InvalidArgument(msg.into())
    }
}
