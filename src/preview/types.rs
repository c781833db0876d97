use unicode_width::UnicodeWidthStr;

/// RGB colour attached to highlighted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness, 0.0 to 255.0.
    pub fn luma(self) -> f32 {
        0.0722f32.mul_add(
            f32::from(self.b),
            0.2126f32.mul_add(f32::from(self.r), 0.7152 * f32::from(self.g)),
        )
    }
}

/// Inline style flags for a run of preview text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SpanStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    pub fg: Option<Rgb>,
}

impl SpanStyle {
    /// Style for code text, optionally coloured.
    pub const fn code(fg: Option<Rgb>) -> Self {
        Self {
            emphasis: false,
            strong: false,
            code: true,
            strikethrough: false,
            link: false,
            fg,
        }
    }
}

/// A run of text sharing one [`SpanStyle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    text: String,
    style: SpanStyle,
}

impl StyledSpan {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SpanStyle::default())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> SpanStyle {
        self.style
    }

    /// Terminal columns occupied by the text.
    pub fn width(&self) -> usize {
        self.text.width()
    }
}

/// What a preview line belongs to, used by the UI to pick its colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Paragraph,
    /// Heading with level 1 to 6
    Heading(u8),
    Code,
    Quote,
    /// List item with nesting depth, starting at 1
    ListItem(usize),
    Table,
    Rule,
    Blank,
}

/// One terminal row of rendered Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    kind: LineKind,
    spans: Vec<StyledSpan>,
}

impl PreviewLine {
    pub const fn new(kind: LineKind, spans: Vec<StyledSpan>) -> Self {
        Self { kind, spans }
    }

    pub const fn blank() -> Self {
        Self::new(LineKind::Blank, Vec::new())
    }

    pub fn plain(kind: LineKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![StyledSpan::plain(text)])
    }

    pub const fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn spans(&self) -> &[StyledSpan] {
        &self.spans
    }

    /// The unstyled text of the line.
    pub fn text(&self) -> String {
        self.spans.iter().map(StyledSpan::text).collect()
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(StyledSpan::width).sum()
    }
}

/// A rendered document, laid out for a fixed pane width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    lines: Vec<PreviewLine>,
    width: usize,
}

impl Preview {
    pub const fn new(lines: Vec<PreviewLine>, width: usize) -> Self {
        Self { lines, width }
    }

    pub fn lines(&self) -> &[PreviewLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The width this preview was laid out for.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Lines in `[offset, offset + count)`, clamped to the document.
    pub fn visible_lines(&self, offset: usize, count: usize) -> &[PreviewLine] {
        let start = offset.min(self.lines.len());
        let end = start.saturating_add(count).min(self.lines.len());
        &self.lines[start..end]
    }

    /// All lines joined with newlines, for tests and debugging.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(PreviewLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
