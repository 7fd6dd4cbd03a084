use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    /// Magic or length mismatch while decoding a chunk.
    #[error("corrupt catalog data at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    /// Unreadable or invalid package; aborts the run.
    #[error("{}: {reason}", path.display())]
    Header { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Checksum cache error: {0}")]
    Cache(String),
}

impl CatalogError {
    pub(crate) fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn header(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Header {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, CatalogError>;
