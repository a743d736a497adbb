//! Error types for nova

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for nova operations
#[derive(Error, Debug)]
pub enum Error {
    /// No conversation record exists for the identifier
    #[error("Conversation not found: {0}")]
    NotFound(String),

    /// Identifier that cannot name a record
    #[error("Invalid conversation identifier: {0:?}")]
    InvalidId(String),

    /// A conversation record could not be written
    #[error("Failed to write conversation {id}: {source}")]
    WriteFailure {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// A persisted record could not be parsed
    #[error("Corrupt record {}: {reason}", .path.display())]
    CorruptRecord { path: PathBuf, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Agent collaborator errors
    #[error("Agent error: {0}")]
    Agent(String),
}

impl Error {
    /// Whether the error should end the running process.
    ///
    /// Nothing in the memory core is fatal: a failed write leaves the
    /// session running without durability for that turn.
    pub fn is_fatal(&self) -> bool {
        false
    }
}

/// A specialized Result type for nova operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
