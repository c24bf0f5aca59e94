//! Error types for obj-fs

use std::path::PathBuf;

/// Result type for obj-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in obj-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid escape sequence in '{input}' at byte {position}")]
    InvalidEscape { input: String, position: usize },

    #[error("Invalid path segment '{segment}': {reason}")]
    InvalidSegment { segment: String, reason: String },

    #[error("Path has no parent directory: {path}")]
    NoParent { path: PathBuf },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
