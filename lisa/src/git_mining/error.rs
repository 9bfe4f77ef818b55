//! Error types for history mining and catalog output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while mining a repository or writing the catalog.
#[derive(Error, Debug)]
pub enum MiningError {
    #[error("Git is not available on this system")]
    GitNotAvailable,

    #[error("Path is not a git repository: {0}")]
    NotARepository(PathBuf),

    /// A git query failed (bad revision, missing path, unreadable object).
    #[error("Git command failed: {0}")]
    CommandFailed(String),

    /// A listing or log record did not have the expected shape.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Descriptor content is not valid JSON.
    #[error("Failed to parse descriptor content: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("Mining task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl MiningError {
    /// Create a malformed record error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    /// Create a write error for `path`
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
