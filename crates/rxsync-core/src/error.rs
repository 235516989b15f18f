//! Error types for rxsync-core

use thiserror::Error;

/// Result type alias using rxsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rxsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local store unavailable or a write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A put raced against a newer stored revision
    #[error("Revision conflict for {id}: stored {stored}, incoming {incoming}")]
    Conflict {
        id: String,
        stored: String,
        incoming: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote transport or API failure
    #[error("Network error: {0}")]
    Network(String),
}

impl Error {
    /// True for the revision-conflict variant, which callers resolve inline
    /// instead of surfacing.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
