use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::app::Model;
use crate::config::LayoutMode;
use crate::editor::Selection;

use super::{CHROME_ROWS, PANE_BORDER, overlays, status, style};

/// Editor and preview areas for `layout` inside `area`.
pub fn split_panes(area: Rect, layout: LayoutMode) -> (Option<Rect>, Option<Rect>) {
    match layout {
        LayoutMode::EditorOnly => (Some(area), None),
        LayoutMode::PreviewOnly => (None, Some(area)),
        LayoutMode::Split => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            (Some(chunks[0]), Some(chunks[1]))
        }
    }
}

/// Width the preview is laid out at, or `None` when it is hidden.
pub fn preview_content_width(total_width: u16, layout: LayoutMode) -> Option<u16> {
    let area = Rect::new(0, 0, total_width, 1);
    let (_, preview) = split_panes(area, layout);
    preview.map(|rect| rect.width.saturating_sub(2 * PANE_BORDER).max(1))
}

/// Rows of content inside either pane for a terminal `rows` tall.
pub const fn pane_height(rows: u16) -> u16 {
    rows.saturating_sub(CHROME_ROWS + 2 * PANE_BORDER)
}

/// Render the complete UI.
///
/// Refreshes the preview first, so a frame never shows stale Markdown.
pub fn render(model: &mut Model, frame: &mut Frame) {
    model.refresh_preview();
    let area = frame.area();

    let [toolbar_area, panes_area, message_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    status::render_toolbar(frame, toolbar_area);
    let (editor_area, preview_area) = split_panes(panes_area, model.layout);
    if let Some(editor_area) = editor_area {
        render_editor(model, frame, editor_area);
    }
    if let Some(preview_area) = preview_area {
        render_preview(model, frame, preview_area);
    }
    status::render_message_bar(model, frame, message_area);
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(frame, area);
    }
}

fn pane_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style::border_style())
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let block = pane_block(" Markdown ".to_string());
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let buffer = model.document.buffer();
    let gutter_width = line_number_width(buffer.line_count());
    let text_width = usize::from(inner.width.saturating_sub(gutter_width + 1));

    // Scroll horizontally just far enough to keep the caret cell on screen
    let cursor = buffer.cursor();
    let cursor_text = buffer.line_at(cursor.line).unwrap_or_default();
    let caret = cursor_text
        .get(..cursor.col)
        .map_or(0, |before| before.chars().count());
    let caret_x: usize = cursor_text.chars().take(caret).map(cell_width).sum();
    let hscroll = (caret_x + 1).saturating_sub(text_width);

    let selection = buffer.selection();
    let mut content: Vec<Line> = Vec::new();
    for line_idx in model.editor_viewport.visible_range() {
        let Some(text) = buffer.line_at(line_idx) else {
            break;
        };
        let line_num = format!(
            "{:>width$} ",
            line_idx + 1,
            width = usize::from(gutter_width)
        );
        let mut spans = vec![Span::styled(line_num, style::gutter_style())];
        spans.extend(editor_line_spans(
            &text,
            buffer.line_start_char(line_idx),
            selection,
            (line_idx == cursor.line).then_some(caret),
            hscroll,
            text_width,
        ));
        content.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(content), inner);
}

/// Spans for one editor line, clipped to `[hscroll, hscroll + width)` columns.
///
/// `line_start` is the character offset of the line in the buffer so the
/// selection can be compared directly. `caret` is a character index within
/// the line; at end of line it is drawn on an extra blank cell.
fn editor_line_spans(
    text: &str,
    line_start: usize,
    selection: Selection,
    caret: Option<usize>,
    hscroll: usize,
    width: usize,
) -> Vec<Span<'static>> {
    let char_count = text.chars().count();
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_style = Style::default();
    let mut x = 0usize;
    let mut used = 0usize;

    for (i, ch) in text.chars().chain(std::iter::once(' ')).enumerate() {
        if i == char_count && caret != Some(i) {
            break;
        }
        let ch = if ch == '\t' { ' ' } else { ch };
        let w = cell_width(ch);
        if x < hscroll {
            x += w;
            continue;
        }
        if used + w > width {
            break;
        }
        x += w;
        used += w;

        let offset = line_start + i;
        let cell_style = if caret == Some(i) {
            style::caret_style()
        } else if offset >= selection.start && offset < selection.end {
            style::selection_style()
        } else {
            Style::default()
        };
        if cell_style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = cell_style;
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    spans
}

fn cell_width(ch: char) -> usize {
    if ch == '\t' { 1 } else { ch.width().unwrap_or(0) }
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let title = format!(" Preview {}% ", model.preview_viewport.scroll_percent());
    let block = pane_block(title);
    let inner = block.inner(area);

    let content: Vec<Line> = model
        .preview()
        .visible_lines(
            model.preview_viewport.offset(),
            usize::from(inner.height),
        )
        .iter()
        .map(|line| {
            let base = style::style_for_line_kind(line.kind());
            let spans = line
                .spans()
                .iter()
                .map(|span| {
                    Span::styled(
                        span.text().to_string(),
                        style::style_for_span(base, span.style()),
                    )
                })
                .collect::<Vec<_>>();
            Line::from(spans).style(base)
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
