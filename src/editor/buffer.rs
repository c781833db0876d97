use ropey::Rope;

use super::markup::Selection;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    /// Update column and reset column memory to match.
    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The text-input surface: a rope with a cursor and an optional selection.
///
/// The selection runs between `anchor` and the cursor in either order.
/// Plain movement drops the anchor; [`EditorBuffer::select`] keeps it.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    anchor: Option<Cursor>,
    dirty: bool,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            anchor: None,
            dirty: false,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the buffer has changed since the last persisted snapshot.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after an autosave).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let mut s = self.rope.line(line_idx).to_string();
        let content_len = strip_line_break(&s).len();
        s.truncate(content_len);
        Some(s)
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    // --- Selection ---

    /// The current selection in character offsets (collapsed when none).
    pub fn selection(&self) -> Selection {
        let head = self.cursor_char_idx();
        let Some(anchor) = self.anchor else {
            return Selection::caret(head);
        };
        let tail = self.char_idx_of(anchor);
        Selection::new(head.min(tail), head.max(tail))
    }

    /// Whether a non-empty span is selected.
    pub fn has_selection(&self) -> bool {
        !self.selection().is_empty()
    }

    /// Drop the selection, keeping the cursor where it is.
    pub const fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Select the whole buffer, cursor at the end.
    pub fn select_all(&mut self) {
        self.anchor = Some(Cursor::new());
        self.move_to_end_keep_anchor();
    }

    /// Extend the selection by moving the cursor in `direction`.
    pub fn select(&mut self, direction: Direction) {
        if self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        }
        self.step(direction);
    }

    /// Replace the whole text and place a collapsed caret at `caret` (characters).
    ///
    /// The caret is clamped to the new text length.
    pub fn replace_all(&mut self, text: &str, caret: usize) {
        self.rope = Rope::from_str(text);
        self.anchor = None;
        self.dirty = true;
        self.move_to_char(caret);
    }

    /// Place a collapsed caret at a character offset (clamped).
    pub fn move_to_char(&mut self, char_idx: usize) {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        let col = self
            .rope
            .slice(line_start..char_idx)
            .chars()
            .map(char::len_utf8)
            .sum();
        self.anchor = None;
        self.cursor = Cursor::at(line, col);
    }

    // --- Editing ---

    /// Insert a character at the cursor, replacing any selection.
    pub fn insert_char(&mut self, ch: char) {
        self.delete_selection();
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, ch);
        // A newline typed after a lone CR joins it into one break.
        self.move_to_char(char_idx + 1);
        self.dirty = true;
    }

    /// Insert a string at the cursor, replacing any selection.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.delete_selection();
        let char_idx = self.cursor_char_idx();
        self.rope.insert(char_idx, s);
        self.move_to_char(char_idx + s.chars().count());
        self.dirty = true;
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the selection, or the character before the cursor (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let char_idx = self.cursor_char_idx();
        if char_idx == 0 {
            return false;
        }
        let start = if char_idx >= 2 && self.is_crlf_at(char_idx - 2) {
            char_idx - 2
        } else {
            char_idx - 1
        };
        self.rope.remove(start..char_idx);
        self.move_to_char(start);
        self.dirty = true;
        true
    }

    /// Delete the selection, or the character at the cursor (Delete key).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let char_idx = self.cursor_char_idx();
        if char_idx >= self.rope.len_chars() {
            return false;
        }
        let end = if self.is_crlf_at(char_idx) {
            char_idx + 2
        } else {
            char_idx + 1
        };
        self.rope.remove(char_idx..end);
        self.dirty = true;
        true
    }

    /// Remove the selected span, leaving the caret at its start.
    ///
    /// Returns `true` if a non-empty span was removed.
    pub fn delete_selection(&mut self) -> bool {
        let selection = self.selection();
        self.anchor = None;
        if selection.is_empty() {
            return false;
        }
        self.rope.remove(selection.start..selection.end);
        self.move_to_char(selection.start);
        self.dirty = true;
        true
    }

    // --- Movement ---

    /// Move the cursor in the given direction, dropping the selection.
    pub fn move_cursor(&mut self, direction: Direction) {
        self.anchor = None;
        self.step(direction);
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.anchor = None;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        self.anchor = None;
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        self.anchor = None;
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(self.cursor.line));
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let trimmed = line[..self.cursor.col].trim_end();
        let pos = trimmed
            .rfind(|c: char| !c.is_alphanumeric() && c != '_')
            .map_or(0, |i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8));
        self.cursor.set_col(pos);
    }

    /// Move cursor one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        self.anchor = None;
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col >= line_len {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let after = &line[self.cursor.col..];
        let word_end = after
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let rest = &after[word_end..];
        let space_end = rest
            .find(|c: char| c.is_alphanumeric() || c == '_')
            .unwrap_or(rest.len());
        self.cursor.set_col(self.cursor.col + word_end + space_end);
    }

    /// Move cursor to a specific line and column.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.anchor = None;
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let line_text = self.line_at(self.cursor.line).unwrap_or_default();
        let mut col = col.min(line_text.len());
        while !line_text.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.set_col(col);
    }

    /// Move cursor to the start of the buffer (Ctrl+Home).
    pub const fn move_to_start(&mut self) {
        self.anchor = None;
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        self.anchor = None;
        self.move_to_end_keep_anchor();
    }

    // --- Private helpers ---

    fn move_to_end_keep_anchor(&mut self) {
        let last_line = self.line_count().saturating_sub(1);
        self.cursor.line = last_line;
        self.cursor.set_col(self.line_len(last_line));
    }

    fn step(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
    }

    /// Character offset of the first character on `line_idx` (clamped).
    pub fn line_start_char(&self, line_idx: usize) -> usize {
        let line_idx = line_idx.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line_idx)
    }

    /// Whether a `\r\n` pair starts at `char_idx`.
    fn is_crlf_at(&self, char_idx: usize) -> bool {
        char_idx + 1 < self.rope.len_chars()
            && self.rope.char(char_idx) == '\r'
            && self.rope.char(char_idx + 1) == '\n'
    }

    fn cursor_char_idx(&self) -> usize {
        self.char_idx_of(self.cursor)
    }

    /// Convert a line/byte-column position to a rope char index.
    fn char_idx_of(&self, cursor: Cursor) -> usize {
        let line_start = self.rope.line_to_char(cursor.line);
        let line_str = self.line_at(cursor.line).unwrap_or_default();
        let byte_col = cursor.col.min(line_str.len());
        line_start + line_str[..byte_col].chars().count()
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let prev_char_len = line[..self.cursor.col]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let next_char_len = line[self.cursor.col..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col + next_char_len);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.col = self.clamp_col(self.cursor.line, self.cursor.col_memory);
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.col = self.clamp_col(self.cursor.line, self.cursor.col_memory);
        }
    }

    /// Clamp a byte column to the line length and back onto a char boundary.
    fn clamp_col(&self, line_idx: usize, col: usize) -> usize {
        let line = self.line_at(line_idx).unwrap_or_default();
        let mut col = col.min(line.len());
        while !line.is_char_boundary(col) {
            col -= 1;
        }
        col
    }
}

/// `line` without its terminating `\n`, `\r\n` or `\r`.
fn strip_line_break(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .field("dirty", &self.dirty)
            .finish()
    }
}
