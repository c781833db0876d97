//! Vertical scroll state for a pane.
//!
//! Both panes scroll independently: the preview by page keys, the editor by
//! following the cursor.

use std::ops::Range;

/// The visible window of a pane over `total` rows.
///
/// ```
/// use mdpad::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(10, 100);
/// vp.page_down();
/// assert_eq!(vp.visible_range(), 10..20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    height: usize,
    offset: usize,
    total: usize,
}

impl Viewport {
    pub const fn new(height: usize, total: usize) -> Self {
        Self {
            height,
            offset: 0,
            total,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn total(&self) -> usize {
        self.total
    }

    pub fn visible_range(&self) -> Range<usize> {
        self.offset..(self.offset + self.height).min(self.total)
    }

    /// Position through the content, 0 to 100. Content that fits is 100.
    pub fn scroll_percent(&self) -> u8 {
        let max = self.max_offset();
        if max == 0 {
            return 100;
        }
        u8::try_from(self.offset * 100 / max).unwrap_or(100)
    }

    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = self.offset.saturating_add(n).min(self.max_offset());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.height.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height.max(1));
    }

    /// Scroll the minimum needed so `row` is on screen.
    pub const fn ensure_visible(&mut self, row: usize) {
        if row < self.offset {
            self.offset = row;
        } else if self.height > 0 && row >= self.offset + self.height {
            self.offset = row + 1 - self.height;
        }
    }

    pub fn resize(&mut self, height: usize) {
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.height)
    }
}
