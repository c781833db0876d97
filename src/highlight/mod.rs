//! Syntax highlighting for fenced code blocks.
//!
//! Wraps syntect's bundled syntaxes and themes. The theme follows the
//! terminal background: an explicit override from configuration wins,
//! otherwise `COLORFGBG` is consulted, otherwise dark is assumed.

use std::sync::{Mutex, OnceLock};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::preview::{Rgb, SpanStyle, StyledSpan};

/// Terminal background the highlighter should assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightBackground {
    Light,
    Dark,
}

static BACKGROUND_OVERRIDE: OnceLock<Mutex<Option<HighlightBackground>>> = OnceLock::new();

/// Force the background used for theme selection. `None` restores detection.
///
/// The theme itself is loaded once, so this must run before the first
/// highlight call to change which theme is picked.
pub fn set_background(mode: Option<HighlightBackground>) {
    let lock = BACKGROUND_OVERRIDE.get_or_init(|| Mutex::new(None));
    if let Ok(mut guard) = lock.lock() {
        *guard = mode;
    }
}

/// The background currently in effect.
pub fn background() -> HighlightBackground {
    let lock = BACKGROUND_OVERRIDE.get_or_init(|| Mutex::new(None));
    if let Ok(guard) = lock.lock()
        && let Some(mode) = *guard
    {
        return mode;
    }
    background_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

/// Highlight `code` as `language`, one span list per source line.
///
/// Unknown or missing languages come back as plain code spans with no
/// colour. Background colours from the theme are never applied so the
/// pane keeps the terminal's own background.
pub fn highlight_code(language: Option<&str>, code: &str) -> Vec<Vec<StyledSpan>> {
    let Some(syntax) = language.and_then(find_syntax) else {
        return code
            .lines()
            .map(|line| vec![StyledSpan::new(line, SpanStyle::code(None))])
            .collect();
    };

    let mode = background();
    let mut highlighter = HighlightLines::new(syntax, theme());
    code.lines()
        .map(|line| match highlighter.highlight_line(line, syntax_set()) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| {
                    let fg = Rgb::new(style.foreground.r, style.foreground.g, style.foreground.b);
                    StyledSpan::new(text, SpanStyle::code(Some(adjust_fg(fg, mode))))
                })
                .collect(),
            Err(err) => {
                tracing::debug!(%err, "highlighting failed, falling back to plain");
                vec![StyledSpan::new(line, SpanStyle::code(None))]
            }
        })
        .collect()
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    let set = syntax_set();
    set.find_syntax_by_token(language)
        .or_else(|| set.find_syntax_by_name(language))
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        let themes = ThemeSet::load_defaults();
        let preferred: &[&str] = match background() {
            HighlightBackground::Dark => &["base16-eighties.dark", "base16-ocean.dark", "Solarized (dark)"],
            HighlightBackground::Light => &["InspiredGitHub", "base16-ocean.light", "Solarized (light)"],
        };
        tracing::debug!(?preferred, "loading highlight theme");

        preferred
            .iter()
            .find_map(|name| themes.themes.get(*name).cloned())
            .or_else(|| themes.themes.values().next().cloned())
            .unwrap_or_default()
    })
}

/// `COLORFGBG` looks like `"15;0"`; the last field is the background index.
fn background_from_colorfgbg(value: Option<&str>) -> HighlightBackground {
    let bg = value
        .and_then(|value| value.rsplit(';').next())
        .and_then(|field| field.parse::<u8>().ok());
    match bg {
        Some(index) if index >= 7 => HighlightBackground::Light,
        _ => HighlightBackground::Dark,
    }
}

/// Darken bright theme colours so they stay readable on a light background.
fn adjust_fg(color: Rgb, mode: HighlightBackground) -> Rgb {
    if mode == HighlightBackground::Dark || color.luma() < 155.0 {
        return color;
    }
    let scale = |channel: u8| (f32::from(channel) * 0.42).round() as u8;
    Rgb::new(scale(color.r), scale(color.g), scale(color.b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_gets_coloured_spans() {
        let lines = highlight_code(Some("rust"), "fn main() {\n    let x = 1;\n}\n");
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().flatten().any(|span| span.style().fg.is_some()));
        assert!(lines.iter().flatten().all(|span| span.style().code));
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let lines = highlight_code(Some("no-such-language"), "just text");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0][0].text(), "just text");
        assert!(lines[0][0].style().fg.is_none());
    }

    #[test]
    fn test_missing_language_is_plain() {
        let lines = highlight_code(None, "a\nb");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().flatten().all(|span| span.style().code));
    }

    #[test]
    fn test_highlighted_text_is_preserved() {
        let code = "let answer = 42;";
        let lines = highlight_code(Some("rs"), code);
        let joined: String = lines[0].iter().map(StyledSpan::text).collect();
        assert_eq!(joined, code);
    }

    #[test]
    fn test_colorfgbg_parsing() {
        assert_eq!(background_from_colorfgbg(Some("15;0")), HighlightBackground::Dark);
        assert_eq!(background_from_colorfgbg(Some("0;15")), HighlightBackground::Light);
        assert_eq!(background_from_colorfgbg(Some("0;default;15")), HighlightBackground::Light);
        assert_eq!(background_from_colorfgbg(Some("garbage")), HighlightBackground::Dark);
        assert_eq!(background_from_colorfgbg(None), HighlightBackground::Dark);
    }

    #[test]
    fn test_override_wins_over_environment() {
        set_background(Some(HighlightBackground::Light));
        assert_eq!(background(), HighlightBackground::Light);
        set_background(Some(HighlightBackground::Dark));
        assert_eq!(background(), HighlightBackground::Dark);
        set_background(None);
    }

    #[test]
    fn test_light_background_darkens_bright_colours() {
        let bright = Rgb::new(240, 230, 120);
        let adjusted = adjust_fg(bright, HighlightBackground::Light);
        assert!(adjusted.luma() < 120.0, "still too bright: {}", adjusted.luma());
        assert_eq!(adjust_fg(bright, HighlightBackground::Dark), bright);
    }

    #[test]
    fn test_dark_colours_are_left_alone_on_light_background() {
        let dark = Rgb::new(30, 40, 50);
        assert_eq!(adjust_fg(dark, HighlightBackground::Light), dark);
    }
}
