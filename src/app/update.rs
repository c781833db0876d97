use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app::{Model, ToastLevel};
use crate::document::check_import_name;
use crate::editor::{Direction, MarkupAction};

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Type a character, replacing any selection
    InsertChar(char),
    /// Insert pasted text or a tab's worth of spaces
    InsertText(String),
    /// Enter
    InsertNewline,
    /// Backspace
    DeleteBack,
    /// Delete
    DeleteForward,
    /// Wrap the selection in a formatting shortcut
    Markup(MarkupAction),

    // Cursor
    MoveCursor(Direction),
    MoveHome,
    MoveEnd,
    MoveWordLeft,
    MoveWordRight,
    MoveToStart,
    MoveToEnd,
    /// Extend the selection (Shift+arrow)
    Select(Direction),
    SelectAll,

    // Preview
    PreviewScrollUp(usize),
    PreviewScrollDown(usize),
    PreviewPageUp,
    PreviewPageDown,

    // Panes
    /// Cycle split / editor only / preview only
    CycleLayout,
    ToggleHelp,
    HideHelp,

    // Files
    /// Write the buffer to the export directory
    Export,
    /// Open the import path prompt
    OpenImportPrompt,
    /// Replace the prompt text
    PromptInput(String),
    PromptCancel,
    /// Accept the path typed into the prompt
    PromptSubmit,
    /// Request an import of `path`
    Import(PathBuf),
    /// A worker finished reading an import
    ImportLoaded {
        name: String,
        content: Result<String, String>,
    },

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    Quit,
}

/// Apply `msg` to the model.
///
/// All state transitions happen here. Work that touches the outside world
/// (writing the export, reading an import) is left to the effects pass,
/// which runs right after with the same message.
pub fn update(model: &mut Model, msg: Message, now: Instant) {
    match msg {
        Message::InsertChar(ch) => edit(model, now, |buf| {
            buf.insert_char(ch);
            true
        }),
        Message::InsertText(text) => edit(model, now, |buf| {
            buf.insert_str(&text);
            !text.is_empty()
        }),
        Message::InsertNewline => edit(model, now, |buf| {
            buf.split_line();
            true
        }),
        Message::DeleteBack => edit(model, now, crate::editor::EditorBuffer::delete_back),
        Message::DeleteForward => edit(model, now, crate::editor::EditorBuffer::delete_forward),
        Message::Markup(action) => {
            if let Err(err) = model.document.apply_action(action, now) {
                model.show_toast_at(ToastLevel::Error, err.to_string(), now);
            }
            model.sync_editor_viewport();
        }

        Message::MoveCursor(direction) => navigate(model, |buf| buf.move_cursor(direction)),
        Message::MoveHome => navigate(model, crate::editor::EditorBuffer::move_home),
        Message::MoveEnd => navigate(model, crate::editor::EditorBuffer::move_end),
        Message::MoveWordLeft => navigate(model, crate::editor::EditorBuffer::move_word_left),
        Message::MoveWordRight => navigate(model, crate::editor::EditorBuffer::move_word_right),
        Message::MoveToStart => navigate(model, crate::editor::EditorBuffer::move_to_start),
        Message::MoveToEnd => navigate(model, crate::editor::EditorBuffer::move_to_end),
        Message::Select(direction) => navigate(model, |buf| buf.select(direction)),
        Message::SelectAll => navigate(model, crate::editor::EditorBuffer::select_all),

        Message::PreviewScrollUp(n) => model.preview_viewport.scroll_up(n),
        Message::PreviewScrollDown(n) => model.preview_viewport.scroll_down(n),
        Message::PreviewPageUp => model.preview_viewport.page_up(),
        Message::PreviewPageDown => model.preview_viewport.page_down(),

        Message::CycleLayout => {
            model.layout = model.layout.next();
            model.reflow();
            tracing::debug!(layout = model.layout.as_str(), "layout changed");
        }
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,

        // Export: handled in effects
        Message::Export => {}

        Message::OpenImportPrompt => model.import_prompt = Some(String::new()),
        Message::PromptInput(text) => {
            if model.import_prompt.is_some() {
                model.import_prompt = Some(text);
            }
        }
        Message::PromptCancel => model.import_prompt = None,
        Message::PromptSubmit => {
            if let Some(text) = model.import_prompt.take() {
                let path = text.trim();
                if !path.is_empty() {
                    request_import(model, PathBuf::from(path), now);
                }
            }
        }
        Message::Import(path) => request_import(model, path, now),
        Message::ImportLoaded { name, content } => {
            model.importing = None;
            match content {
                Ok(content) => match model.document.import(&name, &content, now) {
                    Ok(()) => {
                        model.editor_viewport = crate::ui::viewport::Viewport::new(
                            model.editor_viewport.height(),
                            model.document.buffer().line_count(),
                        );
                        model.preview_viewport.scroll_up(usize::MAX);
                        let words = model.document.word_count();
                        let shown = Path::new(&name)
                            .file_name()
                            .map_or_else(|| name.clone(), |n| n.to_string_lossy().into_owned());
                        model.show_toast_at(
                            ToastLevel::Info,
                            format!("Imported {shown} ({words} words)"),
                            now,
                        );
                    }
                    Err(err) => model.show_toast_at(ToastLevel::Error, err.to_string(), now),
                },
                Err(err) => {
                    model.show_toast_at(ToastLevel::Error, format!("Import failed: {err}"), now);
                }
            }
        }

        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.reflow();
        }

        Message::Quit => model.should_quit = true,
    }
}

fn edit<F>(model: &mut Model, now: Instant, f: F)
where
    F: FnOnce(&mut crate::editor::EditorBuffer) -> bool,
{
    model.document.edit(now, f);
    model.sync_editor_viewport();
}

fn navigate<F>(model: &mut Model, f: F)
where
    F: FnOnce(&mut crate::editor::EditorBuffer),
{
    model.document.navigate(f);
    model.sync_editor_viewport();
}

/// Check the name up front; only accepted paths reach the worker.
fn request_import(model: &mut Model, path: PathBuf, now: Instant) {
    let name = path.to_string_lossy().into_owned();
    if let Err(err) = check_import_name(&name) {
        tracing::info!(%name, "import rejected");
        model.show_toast_at(ToastLevel::Error, err.to_string(), now);
        return;
    }
    if let Some(busy) = &model.importing {
        let message = format!("Still importing {busy}");
        model.show_toast_at(ToastLevel::Warning, message, now);
        return;
    }
    model.import_request = Some(path);
}
