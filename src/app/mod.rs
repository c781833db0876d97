//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions, driven by an explicit clock
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Controller, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::config::LayoutMode;
use crate::document::ControllerConfig;
use crate::store::KeyValueStore;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    config: ControllerConfig,
    store: Option<Box<dyn KeyValueStore>>,
    layout: LayoutMode,
    export_dir: PathBuf,
    initial_import: Option<PathBuf>,
}

impl App {
    /// Create an application editing the document kept in `store`.
    pub fn new(config: ControllerConfig, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            config,
            store: Some(store),
            layout: LayoutMode::default(),
            export_dir: PathBuf::from("."),
            initial_import: None,
        }
    }

    /// Set the initial pane layout.
    #[must_use]
    pub const fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    /// Set where exports are written.
    #[must_use]
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    /// Import `path` once the stored document has been restored.
    #[must_use]
    pub fn with_initial_import(mut self, path: Option<PathBuf>) -> Self {
        self.initial_import = path;
        self
    }
}

#[cfg(test)]
mod tests;
