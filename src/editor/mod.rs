//! Editing primitives: the rope-backed input surface and formatting shortcuts.
//!
//! [`markup`] holds the pure insertion logic; [`EditorBuffer`] adapts it to a
//! cursor-and-selection model driven by key events.

mod buffer;
pub mod markup;

pub use buffer::{Cursor, Direction, EditorBuffer};
pub use markup::{MarkupAction, MarkupEdit, Selection, apply_markup};
