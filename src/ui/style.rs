//! Theming and color definitions.
//!
//! Preview lines carry a [`LineKind`] and per-span [`SpanStyle`]; this module
//! turns those into terminal styles. Named ANSI colors are used where
//! possible so the terminal palette still applies.

use ratatui::style::{Color, Modifier, Style};

use crate::highlight::HighlightBackground;
use crate::preview::{LineKind, Rgb, SpanStyle};

fn light_background() -> bool {
    crate::highlight::background() == HighlightBackground::Light
}

/// Get the base style for a preview line.
pub fn style_for_line_kind(kind: LineKind) -> Style {
    let light_bg = light_background();
    match kind {
        LineKind::Heading(1) => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Cyan
            })
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(2) => Style::default()
            .fg(if light_bg {
                Color::Indexed(22)
            } else {
                Color::Green
            })
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(3) => Style::default()
            .fg(if light_bg {
                Color::Indexed(58)
            } else {
                Color::Yellow
            })
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(_) => Style::default()
            .fg(if light_bg {
                Color::Indexed(54)
            } else {
                Color::Magenta
            })
            .add_modifier(Modifier::BOLD),

        // Code blocks are dimmed; highlighted spans lift the dim again
        LineKind::Code => Style::default()
            .fg(if light_bg {
                Color::Indexed(238)
            } else {
                Color::Indexed(245)
            })
            .add_modifier(Modifier::DIM),

        LineKind::Quote => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Blue
            })
            .add_modifier(Modifier::ITALIC),

        LineKind::Rule | LineKind::Table => Style::default().fg(if light_bg {
            Color::Indexed(241)
        } else {
            Color::Indexed(244)
        }),

        LineKind::ListItem(_) | LineKind::Paragraph | LineKind::Blank => Style::default(),
    }
}

/// Get the style for an inline span, merged with a base line style.
pub fn style_for_span(base: Style, span: SpanStyle) -> Style {
    let mut style = base;

    if let Some(fg) = span.fg {
        style = style
            .fg(fg_color_for_terminal(fg))
            .remove_modifier(Modifier::DIM);
    }
    if span.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if span.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if span.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if span.link {
        style = style.add_modifier(Modifier::UNDERLINED);
        if span.fg.is_none() {
            style = style.fg(if light_background() {
                Color::Blue
            } else {
                Color::LightBlue
            });
        }
    }
    // Inline code only; code block lines already have their own colour
    if span.code && span.fg.is_none() && base.fg.is_none() {
        style = style.fg(if light_background() {
            Color::Indexed(88)
        } else {
            Color::Red
        });
    }

    style
}

/// Line numbers in the editor gutter.
pub fn gutter_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// The cell under the editor cursor.
pub fn caret_style() -> Style {
    Style::default().bg(Color::White).fg(Color::Black)
}

/// Selected text in the editor.
pub fn selection_style() -> Style {
    Style::default().bg(if light_background() {
        Color::Indexed(252)
    } else {
        Color::DarkGray
    })
}

pub fn border_style() -> Style {
    Style::default().fg(Color::Indexed(240))
}

/// Bottom status bar.
pub fn status_style() -> Style {
    if light_background() {
        Style::default().bg(Color::Indexed(252)).fg(Color::Indexed(235))
    } else {
        Style::default().bg(Color::Indexed(236)).fg(Color::Indexed(252))
    }
}

/// Key names in the toolbar hint row.
pub fn key_hint_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub fn dim_style() -> Style {
    Style::default().fg(Color::Indexed(245))
}

fn fg_color_for_terminal(fg: Rgb) -> Color {
    if supports_truecolor() {
        Color::Rgb(fg.r, fg.g, fg.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(fg.r, fg.g, fg.b))
    }
}

fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("MDPAD_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_styles_are_bold() {
        for level in 1..=6 {
            let style = style_for_line_kind(LineKind::Heading(level));
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn test_code_block_style() {
        let style = style_for_line_kind(LineKind::Code);
        assert!(style.fg.is_some());
        assert!(style.add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_span_color_removes_dim_modifier() {
        let base = style_for_line_kind(LineKind::Code);
        let styled = style_for_span(base, SpanStyle::code(Some(Rgb::new(255, 0, 0))));
        assert!(!styled.add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_inline_code_gets_a_colour() {
        let span = SpanStyle {
            code: true,
            ..SpanStyle::default()
        };
        assert!(style_for_span(Style::default(), span).fg.is_some());
    }

    #[test]
    fn test_emphasis_and_strike_modifiers() {
        let span = SpanStyle {
            emphasis: true,
            strong: true,
            strikethrough: true,
            ..SpanStyle::default()
        };
        let style = style_for_span(Style::default(), span);
        assert!(style.add_modifier.contains(Modifier::ITALIC));
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn test_truecolor_detection_without_colorterm() {
        assert!(!supports_truecolor_from_env(None, Some("xterm-256color")));
    }

    #[test]
    fn test_truecolor_detection_with_colorterm() {
        assert!(supports_truecolor_from_env(
            Some("truecolor"),
            Some("xterm-256color")
        ));
    }

    #[test]
    fn test_fallback_indexed_color_when_not_truecolor() {
        assert_eq!(rgb_to_xterm_256(255, 0, 0), 196);
    }
}
