use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::document::SaveState;
use crate::editor::MarkupAction;

use super::style;

/// The formatting shortcut hints across the top row.
pub fn render_toolbar(frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for action in MarkupAction::ALL {
        spans.push(Span::styled(
            format!("M-{}", action.key()),
            style::key_hint_style(),
        ));
        spans.push(Span::styled(format!(" {}  ", action.label()), style::dim_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// The import prompt while it is open, otherwise the active toast.
pub fn render_message_bar(model: &Model, frame: &mut Frame, area: Rect) {
    if let Some(prompt) = model.import_prompt.as_deref() {
        let text = format!("Import .md file: {prompt}\u{2588}  Enter: open  Esc: cancel");
        let bar = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));
        frame.render_widget(bar, area);
        return;
    }
    render_toast_bar(model, frame, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let status_bar = Paragraph::new(status_text(model)).style(style::status_style());
    frame.render_widget(status_bar, area);
}

pub(super) fn status_text(model: &Model) -> String {
    let save_state = match model.document.save_state() {
        SaveState::Idle => "saved",
        SaveState::PendingSave => "unsaved",
    };
    let words = model.document.word_count();
    let noun = if words == 1 { "word" } else { "words" };
    let cursor = model.document.buffer().cursor();
    let line_text = model
        .document
        .buffer()
        .line_at(cursor.line)
        .unwrap_or_default();
    let col = line_text
        .get(..cursor.col)
        .map_or(0, |before| before.chars().count());
    let importing = model
        .importing
        .as_deref()
        .map_or_else(String::new, |name| format!("  [importing {name}]"));

    format!(
        " mdpad  [{save_state}]  {words} {noun}  Ln {}, Col {}  {}{importing}  ^S export  ^O import  ^E layout  F1 help",
        cursor.line + 1,
        col + 1,
        model.layout.as_str(),
    )
}
