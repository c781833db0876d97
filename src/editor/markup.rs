//! Formatting shortcuts applied around a selection.
//!
//! [`apply_markup`] is a pure function over the buffer text: it never touches
//! an editor widget. The buffer adapter calls it and then installs the result.

use crate::error::{Error, Result};

/// A selection expressed as zero-based character offsets, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A collapsed selection (plain caret) at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub const fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of applying markup: the new text and where the caret lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupEdit {
    pub text: String,
    pub selection: Selection,
}

/// Wrap the selected span of `buffer` in `prefix` and `suffix`.
///
/// The selected text is replaced by `prefix + selected + suffix` and the
/// caret is collapsed right after the inserted suffix. An empty `suffix`
/// gives a plain prefix insertion (list bullets, quote markers).
///
/// # Errors
/// Returns [`Error::InvalidRange`] if `selection.start > selection.end` or
/// `selection.end` lies past the end of `buffer`.
pub fn apply_markup(
    buffer: &str,
    selection: Selection,
    prefix: &str,
    suffix: &str,
) -> Result<MarkupEdit> {
    let len = buffer.chars().count();
    if selection.start > selection.end || selection.end > len {
        return Err(Error::InvalidRange {
            start: selection.start,
            end: selection.end,
            len,
        });
    }

    let start_byte = byte_offset(buffer, selection.start);
    let end_byte = byte_offset(buffer, selection.end);
    let selected = &buffer[start_byte..end_byte];

    let mut text = String::with_capacity(buffer.len() + prefix.len() + suffix.len());
    text.push_str(&buffer[..start_byte]);
    text.push_str(prefix);
    text.push_str(selected);
    text.push_str(suffix);
    text.push_str(&buffer[end_byte..]);

    let caret = selection.start
        + prefix.chars().count()
        + selection.len()
        + suffix.chars().count();

    Ok(MarkupEdit {
        text,
        selection: Selection::caret(caret),
    })
}

/// Byte index of the `char_idx`-th character, or `text.len()` past the end.
fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Toolbar formatting shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupAction {
    Bold,
    Italic,
    Strikethrough,
    InlineCode,
    CodeBlock,
    Link,
    Heading,
    Blockquote,
    BulletList,
}

impl MarkupAction {
    pub const ALL: [Self; 9] = [
        Self::Bold,
        Self::Italic,
        Self::Strikethrough,
        Self::InlineCode,
        Self::CodeBlock,
        Self::Link,
        Self::Heading,
        Self::Blockquote,
        Self::BulletList,
    ];

    /// The `(prefix, suffix)` pair inserted around the selection.
    pub const fn tokens(self) -> (&'static str, &'static str) {
        match self {
            Self::Bold => ("**", "**"),
            Self::Italic => ("_", "_"),
            Self::Strikethrough => ("~~", "~~"),
            Self::InlineCode => ("`", "`"),
            Self::CodeBlock => ("\n```\n", "\n```"),
            Self::Link => ("[", "](https://)"),
            Self::Heading => ("# ", ""),
            Self::Blockquote => ("> ", ""),
            Self::BulletList => ("- ", ""),
        }
    }

    /// Short label for the toolbar hint line.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Strikethrough => "strike",
            Self::InlineCode => "code",
            Self::CodeBlock => "block",
            Self::Link => "link",
            Self::Heading => "heading",
            Self::Blockquote => "quote",
            Self::BulletList => "list",
        }
    }

    /// The Alt-modified key that triggers this shortcut.
    pub const fn key(self) -> char {
        match self {
            Self::Bold => 'b',
            Self::Italic => 'i',
            Self::Strikethrough => 's',
            Self::InlineCode => 'c',
            Self::CodeBlock => 'k',
            Self::Link => 'l',
            Self::Heading => 'h',
            Self::Blockquote => 'q',
            Self::BulletList => 'u',
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.key() == key)
    }
}
