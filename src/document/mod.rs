//! The document being edited and everything derived from it.
//!
//! This module handles:
//! - Owning the buffer ([`DocumentController`])
//! - Restoring and autosaving snapshots through a [`KeyValueStore`]
//! - Import validation and export payloads
//!
//! [`KeyValueStore`]: crate::store::KeyValueStore

mod controller;

pub use controller::{ControllerConfig, DocumentController, ExportPayload, SaveState};

use crate::error::{Error, Result};

/// Document shown on first launch.
pub const SEED_TEXT: &str = include_str!("seed.md");

/// Suggested file name for exported documents.
pub const EXPORT_FILE_NAME: &str = "markdown-preview.md";

/// MIME type of exported documents.
pub const EXPORT_MIME_TYPE: &str = "text/markdown";

/// The only extension accepted on import.
pub const IMPORT_EXTENSION: &str = ".md";

/// Check that `name` is an importable file name.
///
/// The check is a plain suffix match on the name, done before any content
/// is read.
///
/// # Errors
/// Returns [`Error::UnsupportedFormat`] unless `name` ends in `.md`.
pub fn check_import_name(name: &str) -> Result<()> {
    if name.ends_with(IMPORT_EXTENSION) {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat {
            name: name.to_string(),
        })
    }
}
