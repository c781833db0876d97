// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. store::MemoryStore)
    clippy::module_name_repetitions
)]

//! # mdpad
//!
//! A terminal Markdown editor with a live preview.
//!
//! mdpad keeps a single document with:
//! - A rope-backed editor pane with selection and formatting shortcuts
//! - A rendered preview pane with syntax-highlighted code blocks
//! - Debounced autosave to a local key-value store, restored on launch
//! - Import of `.md` files and export to `markdown-preview.md`
//!
//! ## Architecture
//!
//! mdpad uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: State transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`document`]: The document controller: restore, autosave, import, export
//! - [`editor`]: Text buffer and formatting shortcuts
//! - [`preview`]: Markdown to styled terminal lines
//! - [`highlight`]: Syntax highlighting
//! - [`store`]: Snapshot storage
//! - [`debounce`]: Clock-driven debouncing
//! - [`words`]: Word counting
//! - [`ui`]: Terminal UI components

pub mod app;
pub mod config;
pub mod debounce;
pub mod document;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod preview;
pub mod store;
pub mod ui;
pub mod words;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{ControllerConfig, DocumentController};
    pub use crate::editor::{EditorBuffer, MarkupAction, Selection};
    pub use crate::store::{FileStore, KeyValueStore, MemoryStore};
    pub use crate::ui::viewport::Viewport;
}
