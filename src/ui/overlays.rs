use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::editor::MarkupAction;

/// Rows of the shortcut reference, section headings included.
pub(super) fn help_lines() -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled("Editing", section_style));
    lines.push(Line::raw("  Arrows, Home/End    Move the cursor"));
    lines.push(Line::raw("  Ctrl+Left/Right     Word movement"));
    lines.push(Line::raw("  Ctrl+Home/End       Buffer start / end"));
    lines.push(Line::raw("  Shift+Arrows        Extend selection"));
    lines.push(Line::raw("  Ctrl+A              Select all"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Formatting", section_style));
    for action in MarkupAction::ALL {
        let (prefix, suffix) = action.tokens();
        let sample = format!("{}text{}", prefix.trim(), suffix.trim()).replace('\n', " ");
        lines.push(Line::raw(format!(
            "  Alt+{}               {:<8}  {sample}",
            action.key(),
            action.label()
        )));
    }
    lines.push(Line::raw(""));

    lines.push(Line::styled("Preview", section_style));
    lines.push(Line::raw("  PageUp/PageDown     Scroll the preview"));
    lines.push(Line::raw("  Mouse wheel         Scroll the preview"));
    lines.push(Line::raw("  Ctrl+E              Split / editor / preview"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Files", section_style));
    lines.push(Line::raw("  Ctrl+S              Export markdown-preview.md"));
    lines.push(Line::raw("  Ctrl+O              Import a .md file"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Other", section_style));
    lines.push(Line::raw("  Ctrl+Q / Ctrl+C     Save and quit"));
    lines.push(Line::raw("  F1                  Toggle help"));
    lines
}

pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let mut lines = help_lines();
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Any key closes",
        Style::default().fg(Color::Indexed(245)),
    ));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_shortcut() {
        let text: String = help_lines()
            .iter()
            .map(|line| line.to_string() + "\n")
            .collect();
        for action in MarkupAction::ALL {
            assert!(text.contains(&format!("Alt+{}", action.key())));
        }
        assert!(text.contains("Ctrl+S"));
    }

    #[test]
    fn test_popup_is_clamped_to_area() {
        let area = Rect::new(0, 0, 30, 10);
        let popup = centered_popup_rect(48, 12, area);
        assert_eq!(popup, Rect::new(0, 0, 30, 10));
    }
}
