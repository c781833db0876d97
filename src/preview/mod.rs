//! Markdown to terminal lines for the preview pane.
//!
//! [`render`] parses with comrak (GitHub-flavoured extensions on) and lays
//! the tree out for a fixed column width. It is a pure function of its
//! inputs, so the caller can cache the result and only re-render when the
//! text or the pane width changes.

mod types;

pub use types::{LineKind, Preview, PreviewLine, Rgb, SpanStyle, StyledSpan};

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::highlight::highlight_code;

/// Narrowest layout width; anything smaller is laid out at this width.
pub const MIN_WIDTH: usize = 8;

/// Render `source` for a pane `width` columns wide.
pub fn render(source: &str, width: usize) -> Preview {
    let width = width.max(MIN_WIDTH);
    let arena = Arena::new();
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    let root = parse_document(&arena, source, &options);

    let mut renderer = Renderer::new(width);
    renderer.children(root, &Gutter::root());
    Preview::new(renderer.finish(), width)
}

/// Text laid down to the left of a block: quote bars and list markers.
#[derive(Debug, Clone)]
struct Gutter {
    /// Prefix for the first row of the next block.
    first: String,
    /// Prefix for every later row.
    rest: String,
    kind: Option<LineKind>,
    tight: bool,
}

impl Gutter {
    const fn root() -> Self {
        Self {
            first: String::new(),
            rest: String::new(),
            kind: None,
            tight: false,
        }
    }

    fn continuation(&self) -> Self {
        Self {
            first: self.rest.clone(),
            ..self.clone()
        }
    }

    fn nest(&self, first: &str, rest: &str, kind: LineKind, tight: bool) -> Self {
        Self {
            first: format!("{}{first}", self.first),
            rest: format!("{}{rest}", self.rest),
            kind: Some(kind),
            tight,
        }
    }

    fn kind_or(&self, fallback: LineKind) -> LineKind {
        self.kind.unwrap_or(fallback)
    }
}

struct Renderer {
    lines: Vec<PreviewLine>,
    width: usize,
    after_gap: bool,
}

impl Renderer {
    const fn new(width: usize) -> Self {
        Self {
            lines: Vec::new(),
            width,
            after_gap: true,
        }
    }

    fn finish(mut self) -> Vec<PreviewLine> {
        while self
            .lines
            .last()
            .is_some_and(|line| line.kind() == LineKind::Blank)
        {
            self.lines.pop();
        }
        self.lines
    }

    fn push(&mut self, line: PreviewLine) {
        self.after_gap = false;
        self.lines.push(line);
    }

    /// Separate two blocks with an empty row, keeping any quote bars.
    fn gap(&mut self, gutter: &Gutter) {
        if gutter.tight || self.after_gap {
            return;
        }
        let bars = gutter.rest.trim_end();
        if bars.is_empty() {
            self.lines.push(PreviewLine::blank());
        } else {
            self.lines.push(PreviewLine::plain(gutter.kind_or(LineKind::Blank), bars));
        }
        self.after_gap = true;
    }

    fn children<'a>(&mut self, node: &'a AstNode<'a>, gutter: &Gutter) {
        let later = gutter.continuation();
        for (index, child) in node.children().enumerate() {
            self.block(child, if index == 0 { gutter } else { &later });
        }
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>, gutter: &Gutter) {
        match &node.data.borrow().value {
            NodeValue::Heading(heading) => {
                self.gap(gutter);
                let mut spans = inline_spans(node);
                for span in &mut spans {
                    *span = StyledSpan::new(
                        span.text(),
                        SpanStyle {
                            strong: true,
                            ..span.style()
                        },
                    );
                }
                let kind = LineKind::Heading(heading.level);
                let rows = wrap_spans(&spans, self.width, &gutter.first, &gutter.rest);
                let underline = rows
                    .iter()
                    .map(|row| row_width(row).saturating_sub(gutter.rest.width()))
                    .max()
                    .unwrap_or(0);
                for row in rows {
                    self.push(PreviewLine::new(kind, row));
                }
                let rule = match heading.level {
                    1 => Some('═'),
                    2 => Some('─'),
                    _ => None,
                };
                if let Some(rule) = rule {
                    let text = format!("{}{}", gutter.rest, rule.to_string().repeat(underline));
                    self.push(PreviewLine::plain(kind, text));
                }
            }

            NodeValue::Paragraph => {
                self.gap(gutter);
                let kind = gutter.kind_or(LineKind::Paragraph);
                let spans = inline_spans(node);
                for row in wrap_spans(&spans, self.width, &gutter.first, &gutter.rest) {
                    self.push(PreviewLine::new(kind, row));
                }
            }

            NodeValue::CodeBlock(code) => {
                self.gap(gutter);
                let language = code.info.split_whitespace().next();
                self.code_block(language, &code.literal, gutter);
            }

            NodeValue::HtmlBlock(html) => {
                self.gap(gutter);
                let kind = gutter.kind_or(LineKind::Paragraph);
                for (index, raw) in html.literal.lines().enumerate() {
                    let lead = if index == 0 { &gutter.first } else { &gutter.rest };
                    self.push(PreviewLine::plain(kind, format!("{lead}{raw}")));
                }
            }

            NodeValue::List(list) => {
                self.gap(gutter);
                let count = node.children().count();
                let last_number = list.start + count.saturating_sub(1);
                let number_width = last_number.to_string().len();
                let depth = match gutter.kind {
                    Some(LineKind::ListItem(depth)) => depth + 1,
                    _ => 1,
                };
                let item_gutter = gutter.continuation();

                for (index, item) in node.children().enumerate() {
                    let marker = match list.list_type {
                        ListType::Bullet => bullet(depth).to_string(),
                        ListType::Ordered => {
                            let delimiter = match list.delimiter {
                                ListDelimType::Paren => ')',
                                ListDelimType::Period => '.',
                            };
                            format!("{:>number_width$}{delimiter}", list.start + index)
                        }
                    };
                    let marker = match &item.data.borrow().value {
                        NodeValue::TaskItem(Some(_)) => "[x]".to_string(),
                        NodeValue::TaskItem(None) => "[ ]".to_string(),
                        _ => marker,
                    };
                    let first = if index == 0 { gutter } else { &item_gutter };
                    let marker = format!("{marker} ");
                    let hang = " ".repeat(marker.width());
                    let nested = Gutter {
                        first: first.first.clone(),
                        ..item_gutter.clone()
                    }
                    .nest(&marker, &hang, LineKind::ListItem(depth), list.tight);
                    if index > 0 {
                        self.gap(&Gutter {
                            tight: list.tight,
                            ..item_gutter.clone()
                        });
                    }
                    self.item(item, &nested);
                }
            }

            NodeValue::BlockQuote => {
                self.gap(gutter);
                let quoted = gutter.nest("│ ", "│ ", LineKind::Quote, false);
                self.children(node, &quoted);
            }

            NodeValue::ThematicBreak => {
                self.gap(gutter);
                let room = self.width.saturating_sub(gutter.first.width()).max(1);
                let text = format!("{}{}", gutter.first, "─".repeat(room));
                self.push(PreviewLine::plain(LineKind::Rule, text));
            }

            NodeValue::Table(table) => {
                self.gap(gutter);
                let rows = table_rows(node);
                let room = self.width.saturating_sub(gutter.rest.width());
                for (index, line) in layout_table(&rows, &table.alignments, room)
                    .into_iter()
                    .enumerate()
                {
                    let lead = if index == 0 { &gutter.first } else { &gutter.rest };
                    let mut spans = vec![StyledSpan::plain(lead.clone())];
                    spans.extend(line);
                    self.push(PreviewLine::new(LineKind::Table, spans));
                }
            }

            _ => self.children(node, gutter),
        }
    }

    /// List items keep their marker on the first row even when empty.
    fn item<'a>(&mut self, node: &'a AstNode<'a>, gutter: &Gutter) {
        if node.children().next().is_none() {
            let kind = gutter.kind_or(LineKind::Paragraph);
            self.push(PreviewLine::plain(kind, gutter.first.clone()));
            return;
        }
        // The marker row must not be preceded by a gap inside the item.
        self.after_gap = true;
        self.children(node, gutter);
    }

    fn code_block(&mut self, language: Option<&str>, literal: &str, gutter: &Gutter) {
        let label = language.unwrap_or("code");
        self.push(PreviewLine::new(
            LineKind::Code,
            vec![
                StyledSpan::plain(gutter.first.clone()),
                StyledSpan::new(format!("╭─ {label}"), SpanStyle::code(None)),
            ],
        ));

        let lead = format!("{}│ ", gutter.rest);
        let room = self.width.saturating_sub(lead.width()).max(1);
        for spans in highlight_code(language, literal) {
            let mut row = vec![StyledSpan::new(lead.clone(), SpanStyle::code(None))];
            row.extend(truncate_spans(&spans, room));
            self.push(PreviewLine::new(LineKind::Code, row));
        }

        self.push(PreviewLine::new(
            LineKind::Code,
            vec![StyledSpan::new(format!("{}╰─", gutter.rest), SpanStyle::code(None))],
        ));
    }
}

const fn bullet(depth: usize) -> char {
    match depth % 3 {
        1 => '•',
        2 => '◦',
        _ => '▪',
    }
}

fn inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<StyledSpan> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_inline(child, SpanStyle::default(), &mut spans);
    }
    spans
}

fn collect_inline<'a>(node: &'a AstNode<'a>, style: SpanStyle, out: &mut Vec<StyledSpan>) {
    let nested = |style: SpanStyle, out: &mut Vec<StyledSpan>| {
        for child in node.children() {
            collect_inline(child, style, out);
        }
    };

    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push(StyledSpan::new(text.clone(), style)),
        NodeValue::Code(code) => out.push(StyledSpan::new(
            code.literal.clone(),
            SpanStyle {
                link: style.link,
                ..SpanStyle::code(None)
            },
        )),
        NodeValue::HtmlInline(html) => out.push(StyledSpan::new(html.clone(), style)),
        NodeValue::SoftBreak => out.push(StyledSpan::new(" ", style)),
        NodeValue::LineBreak => out.push(StyledSpan::new("\n", style)),
        NodeValue::Emph => nested(SpanStyle { emphasis: true, ..style }, out),
        NodeValue::Strong => nested(SpanStyle { strong: true, ..style }, out),
        NodeValue::Strikethrough => nested(
            SpanStyle {
                strikethrough: true,
                ..style
            },
            out,
        ),
        NodeValue::Link(_) => nested(SpanStyle { link: true, ..style }, out),
        NodeValue::Image(image) => {
            let mut alt = Vec::new();
            nested(style, &mut alt);
            let alt: String = alt.iter().map(StyledSpan::text).collect();
            let label = if alt.is_empty() { image.url.clone() } else { alt };
            out.push(StyledSpan::new(
                format!("[image: {label}]"),
                SpanStyle { link: true, ..style },
            ));
        }
        _ => nested(style, out),
    }
}

/// Break styled text into whitespace and non-whitespace runs, keeping hard
/// breaks as standalone `"\n"` tokens.
fn split_tokens(spans: &[StyledSpan]) -> Vec<StyledSpan> {
    let mut tokens = Vec::new();
    for span in spans {
        let mut current = String::new();
        let mut in_space = None;
        for ch in span.text().chars() {
            if ch == '\n' {
                if !current.is_empty() {
                    tokens.push(StyledSpan::new(std::mem::take(&mut current), span.style()));
                }
                tokens.push(StyledSpan::new("\n", span.style()));
                in_space = None;
                continue;
            }
            let space = ch.is_whitespace();
            if in_space.is_some_and(|was| was != space) {
                tokens.push(StyledSpan::new(std::mem::take(&mut current), span.style()));
            }
            in_space = Some(space);
            current.push(ch);
        }
        if !current.is_empty() {
            tokens.push(StyledSpan::new(current, span.style()));
        }
    }
    tokens
}

struct Row {
    spans: Vec<StyledSpan>,
    used: usize,
    has_word: bool,
    space: Option<StyledSpan>,
}

impl Row {
    fn start(prefix: &str) -> Self {
        let spans = if prefix.is_empty() {
            Vec::new()
        } else {
            vec![StyledSpan::plain(prefix)]
        };
        Self {
            spans,
            used: prefix.width(),
            has_word: false,
            space: None,
        }
    }

    fn push(&mut self, span: StyledSpan) {
        self.used += span.width();
        self.spans.push(span);
    }
}

/// Greedy word wrap. Words wider than a whole row are split by character.
fn wrap_spans(
    spans: &[StyledSpan],
    width: usize,
    first: &str,
    rest: &str,
) -> Vec<Vec<StyledSpan>> {
    let mut rows = Vec::new();
    let mut row = Row::start(first);

    for token in split_tokens(spans) {
        if token.text() == "\n" {
            rows.push(std::mem::replace(&mut row, Row::start(rest)).spans);
            continue;
        }
        if token.text().chars().all(char::is_whitespace) {
            if row.has_word {
                row.space = Some(StyledSpan::new(" ", token.style()));
            }
            continue;
        }

        let space_width = row.space.as_ref().map_or(0, StyledSpan::width);
        if row.has_word && row.used + space_width + token.width() > width {
            rows.push(std::mem::replace(&mut row, Row::start(rest)).spans);
        }
        if let Some(space) = row.space.take() {
            row.push(space);
        }

        let mut word = token;
        loop {
            let room = width.saturating_sub(row.used).max(1);
            if word.width() <= room {
                row.push(word);
                row.has_word = true;
                break;
            }
            let (head, tail) = split_at_width(word.text(), room);
            row.push(StyledSpan::new(head, word.style()));
            rows.push(std::mem::replace(&mut row, Row::start(rest)).spans);
            word = StyledSpan::new(tail, word.style());
        }
    }

    rows.push(row.spans);
    rows
}

/// Split after at most `cols` columns, always taking at least one char.
fn split_at_width(text: &str, cols: usize) -> (String, String) {
    let mut used = 0;
    let mut split = text.len();
    for (index, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > cols && index > 0 {
            split = index;
            break;
        }
        used += w;
    }
    (text[..split].to_string(), text[split..].to_string())
}

fn truncate_spans(spans: &[StyledSpan], cols: usize) -> Vec<StyledSpan> {
    let mut out = Vec::new();
    let mut left = cols;
    for span in spans {
        if left == 0 {
            break;
        }
        let mut taken = String::new();
        for ch in span.text().chars() {
            let w = ch.width().unwrap_or(0);
            if w > left {
                left = 0;
                break;
            }
            left -= w;
            taken.push(ch);
        }
        if !taken.is_empty() {
            out.push(StyledSpan::new(taken, span.style()));
        }
    }
    out
}

fn row_width(spans: &[StyledSpan]) -> usize {
    spans.iter().map(StyledSpan::width).sum()
}

struct TableRow {
    header: bool,
    cells: Vec<String>,
}

fn table_rows<'a>(table: &'a AstNode<'a>) -> Vec<TableRow> {
    table
        .children()
        .filter_map(|row| match row.data.borrow().value {
            NodeValue::TableRow(header) => Some(TableRow {
                header,
                cells: row
                    .children()
                    .map(|cell| {
                        let text: String =
                            inline_spans(cell).iter().map(StyledSpan::text).collect();
                        text.split_whitespace().collect::<Vec<_>>().join(" ")
                    })
                    .collect(),
            }),
            _ => None,
        })
        .collect()
}

/// Box-drawn table, columns shrunk widest-first until it fits `room`.
fn layout_table(rows: &[TableRow], alignments: &[TableAlignment], room: usize) -> Vec<Vec<StyledSpan>> {
    let columns = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
    if columns == 0 {
        return Vec::new();
    }

    let mut widths = vec![1usize; columns];
    for row in rows {
        for (col, cell) in row.cells.iter().enumerate() {
            widths[col] = widths[col].max(cell.width());
        }
    }
    // Each column costs its width plus two padding cells and one border.
    let total = |widths: &[usize]| 1 + widths.iter().map(|w| w + 3).sum::<usize>();
    while total(&widths) > room {
        let Some(widest) = (0..columns).max_by_key(|&col| widths[col]) else {
            break;
        };
        if widths[widest] <= 1 {
            break;
        }
        widths[widest] -= 1;
    }

    let border = |left: char, mid: char, right: char| {
        let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        vec![StyledSpan::plain(format!(
            "{left}{}{right}",
            inner.join(&mid.to_string())
        ))]
    };

    let mut lines = vec![border('┌', '┬', '┐')];
    for (index, row) in rows.iter().enumerate() {
        let style = SpanStyle {
            strong: row.header,
            ..SpanStyle::default()
        };
        let mut spans = vec![StyledSpan::plain("│")];
        for (col, width) in widths.iter().enumerate() {
            let cell = row.cells.get(col).map_or("", String::as_str);
            let (text, _) = split_at_width(cell, *width);
            let text = if text.width() > *width { String::new() } else { text };
            let pad = width - text.width();
            let (left, right) = match alignments.get(col).copied().unwrap_or(TableAlignment::None) {
                TableAlignment::Right => (pad, 0),
                TableAlignment::Center => (pad / 2, pad - pad / 2),
                TableAlignment::Left | TableAlignment::None => (0, pad),
            };
            spans.push(StyledSpan::plain(" ".repeat(left + 1)));
            spans.push(StyledSpan::new(text, style));
            spans.push(StyledSpan::plain(format!("{} │", " ".repeat(right))));
        }
        lines.push(spans);
        if row.header && index == 0 {
            lines.push(border('├', '┼', '┤'));
        }
    }
    lines.push(border('└', '┴', '┘'));
    lines
}
