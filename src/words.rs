//! Word counting for the status bar.

/// Count whitespace-separated words in `text`.
///
/// Runs of whitespace (spaces, tabs, newlines) collapse into a single
/// separator, so leading, trailing, and repeated whitespace never adds
/// phantom words. Whitespace-only input counts as zero.
pub fn count_words(text: &str) -> usize {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }
    trimmed.split_whitespace().count()
}
