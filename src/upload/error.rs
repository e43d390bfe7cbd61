use thiserror::Error;

use super::types::StatusKind;

/// Why a candidate file was refused at admission. No item is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("File size exceeds {limit_mb}MB limit")]
    SizeExceeded { size: u64, limit_mb: u64 },

    #[error("File type not supported. Accepted types: {}", .accepted.join(", "))]
    TypeNotAllowed { accepted: Vec<String> },

    #[error("File \"{name}\" already added")]
    DuplicateFile { name: String },

    #[error("Maximum {max_files} files allowed")]
    BatchFull { max_files: usize },
}

/// Failure of a single transfer. Terminal for that item only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Failed to read file: {0}")]
    Read(String),

    #[error("Network error occurred: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the response body, or a status line
    /// when the body was empty.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid server response: {0}")]
    ResponseParse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid upload transition from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: StatusKind,
    pub to: StatusKind,
}
