//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management
//! - [`style`]: Theming and colors
//!
//! The screen is a toolbar hint row, the editor and preview panes side by
//! side (or one of them alone), a message row and the status bar.

pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::{line_number_width, pane_height, preview_content_width, render, split_panes};

/// Rows outside the panes: toolbar, message line and status bar.
pub const CHROME_ROWS: u16 = 3;

/// Border thickness around each pane.
pub const PANE_BORDER: u16 = 1;
