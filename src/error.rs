//! Error types shared by the editing core.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by the document core.
///
/// None of these are fatal: an invalid range is a caller bug, an unsupported
/// import is reported to the user, and storage failures only mean autosave
/// did not happen.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid selection {start}..{end} for buffer of {len} characters")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("unsupported file format: {name} (expected a .md file)")]
    UnsupportedFormat { name: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

/// Failures of the durable key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode store {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
