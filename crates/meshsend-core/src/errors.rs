//! Error types for meshsend
//!
//! Every failure that can end a transfer run is a variant of [`MeshSendError`].
//! Nothing is retried: each variant is terminal for the current invocation.

use std::path::PathBuf;

use thiserror::Error;

// ----------------------------------------------------------------------------
// Wire Format Errors
// ----------------------------------------------------------------------------

/// Errors produced when parsing an `IMG i/total:...` chunk message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("Missing \"IMG \" prefix")]
    MissingPrefix,

    #[error("Malformed chunk header: {0}")]
    MalformedHeader(String),

    #[error("Chunk index {index} out of range 1..={total}")]
    IndexOutOfRange { index: usize, total: usize },
}

// ----------------------------------------------------------------------------
// Main Error Type
// ----------------------------------------------------------------------------

/// Errors that terminate a transfer
#[derive(Debug, Error)]
pub enum MeshSendError {
    #[error("File too large: {} is {size} bytes (max: {max_size})", path.display())]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    #[error("Failed to connect to {device}: {reason}")]
    Connection { device: String, reason: String },

    #[error("Contact '{name}' not found")]
    ContactNotFound { name: String },

    #[error("Failed to send chunk {index}: {reason}")]
    ChunkSend {
        index: usize,
        total: usize,
        reason: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid chunk message: {0}")]
    Wire(#[from] WireError),

    #[error("Transfer interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for meshsend operations
pub type Result<T> = std::result::Result<T, MeshSendError>;
