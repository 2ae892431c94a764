//! Error types for socratic-core

use thiserror::Error;

/// Result type alias using socratic-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from exporting or importing conversation logs
#[derive(Error, Debug)]
pub enum Error {
    /// Writing or reading the log file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The log is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record is well-formed JSON but breaks a message invariant
    #[error("Invalid message record: {0}")]
    InvalidRecord(String),
}

/// Why a submission was turned away. A rejected submission changes nothing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("topic is empty")]
    EmptyTopic,

    #[error("perspective is empty")]
    EmptyPerspective,

    #[error("a reply is already being generated")]
    Busy,
}
