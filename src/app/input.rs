use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Message, Model};
use crate::debounce::Debouncer;
use crate::editor::{Direction, MarkupAction};

/// Rows scrolled per mouse wheel notch.
const WHEEL_STEP: usize = 3;

/// Spaces inserted for Tab.
const TAB_WIDTH: usize = 4;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now: Instant,
        resize_debouncer: &mut Debouncer<(u16, u16)>,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) => paste_message(text, model),
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.call((*w, *h), now);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        let preview_area = preview_mouse_area(model)?;
        if !point_in_rect(mouse.column, mouse.row, preview_area) {
            return None;
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => Some(Message::PreviewScrollDown(WHEEL_STEP)),
            MouseEventKind::ScrollUp => Some(Message::PreviewScrollUp(WHEEL_STEP)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        if let Some(prompt) = model.import_prompt.as_ref() {
            return match key.code {
                KeyCode::Esc => Some(Message::PromptCancel),
                KeyCode::Enter => Some(Message::PromptSubmit),
                KeyCode::Backspace => {
                    let mut next = prompt.clone();
                    next.pop();
                    Some(Message::PromptInput(next))
                }
                KeyCode::Char(c)
                    if !key.modifiers.contains(KeyModifiers::CONTROL)
                        && !key.modifiers.contains(KeyModifiers::ALT) =>
                {
                    let mut next = prompt.clone();
                    next.push(c);
                    Some(Message::PromptInput(next))
                }
                _ => None,
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            // Formatting shortcuts
            KeyCode::Char(c) if alt && !ctrl => {
                MarkupAction::from_key(c.to_ascii_lowercase()).map(Message::Markup)
            }

            // Application
            KeyCode::Char('q' | 'c') if ctrl => Some(Message::Quit),
            KeyCode::Char('s') if ctrl => Some(Message::Export),
            KeyCode::Char('o') if ctrl => Some(Message::OpenImportPrompt),
            KeyCode::Char('e') if ctrl => Some(Message::CycleLayout),
            KeyCode::Char('a') if ctrl => Some(Message::SelectAll),
            KeyCode::F(1) => Some(Message::ToggleHelp),

            // Selection
            KeyCode::Up if shift => Some(Message::Select(Direction::Up)),
            KeyCode::Down if shift => Some(Message::Select(Direction::Down)),
            KeyCode::Left if shift => Some(Message::Select(Direction::Left)),
            KeyCode::Right if shift => Some(Message::Select(Direction::Right)),

            // Cursor
            KeyCode::Left if ctrl => Some(Message::MoveWordLeft),
            KeyCode::Right if ctrl => Some(Message::MoveWordRight),
            KeyCode::Home if ctrl => Some(Message::MoveToStart),
            KeyCode::End if ctrl => Some(Message::MoveToEnd),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),

            // Preview
            KeyCode::PageUp if preview_visible(model) => Some(Message::PreviewPageUp),
            KeyCode::PageDown if preview_visible(model) => Some(Message::PreviewPageDown),

            // Editing
            KeyCode::Enter => Some(Message::InsertNewline),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Tab => Some(Message::InsertText(" ".repeat(TAB_WIDTH))),
            KeyCode::Char(c) if !ctrl => Some(Message::InsertChar(c)),

            _ => None,
        }
    }

    pub(super) fn view(model: &mut Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

/// Pasted text arrives as one event; the prompt takes it as typed input.
fn paste_message(text: &str, model: &Model) -> Option<Message> {
    if model.help_visible {
        return None;
    }
    if let Some(prompt) = model.import_prompt.as_ref() {
        let line = text.lines().next().unwrap_or_default();
        return Some(Message::PromptInput(format!("{prompt}{line}")));
    }
    Some(Message::InsertText(text.replace("\r\n", "\n").replace('\r', "\n")))
}

fn preview_visible(model: &Model) -> bool {
    crate::ui::preview_content_width(model.terminal_size.0, model.layout).is_some()
}

/// Screen area of the preview pane, if it is shown.
fn preview_mouse_area(model: &Model) -> Option<Rect> {
    let (width, height) = model.terminal_size;
    let panes = Rect::new(0, 1, width, height.saturating_sub(crate::ui::CHROME_ROWS));
    crate::ui::split_panes(panes, model.layout).1
}

const fn point_in_rect(col: u16, row: u16, rect: Rect) -> bool {
    col >= rect.x
        && col < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}
