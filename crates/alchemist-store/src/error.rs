//! Error types for the persistence layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! I/O and serialization errors with the path or section that failed.

use std::path::PathBuf;

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The player save could not be encoded or decoded.
    #[error("Save file error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A catalog seed section could not be parsed.
    #[error("Seed error in {section}: {message}")]
    Seed {
        /// The seed section (`ingredients`, `recipes`, `cities`, `events`).
        section: String,
        /// Parser message.
        message: String,
    },
}

impl StoreError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
