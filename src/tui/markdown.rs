//! Markdown → ratatui `Text` for assistant answers.
//!
//! Walks `pulldown_cmark` events and emits styled lines. Supports headings,
//! emphasis, strong, strikethrough, inline code, fenced code (highlighted by
//! syntect when the language is known), nested lists, block quotes, links,
//! simple tables and horizontal rules. Anything else is dropped.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthStr;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME: LazyLock<Option<Theme>> = LazyLock::new(|| {
    let mut themes = ThemeSet::load_defaults();
    themes.themes.remove("base16-ocean.dark")
});

/// Colors used for one rendered answer.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub text: Color,
    pub accent: Color,
    pub muted: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            text: Color::Reset,
            accent: Color::Red,
            muted: Color::DarkGray,
        }
    }
}

/// Render `content` as owned `Text`.
pub fn render(content: &str, palette: Palette) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);

    let mut out = Renderer::new(palette);
    for event in Parser::new_ext(content, opts) {
        out.event(event);
    }
    out.finish()
}

enum ListKind {
    Bullet,
    Numbered(u64),
}

#[derive(Default)]
struct Table {
    rows: Vec<Vec<String>>,
    current: Vec<String>,
    cell: String,
    header_rows: usize,
}

struct Renderer {
    palette: Palette,
    lines: Vec<Line<'static>>,
    /// Inline modifiers, innermost last
    inline: Vec<Style>,
    quote_depth: usize,
    lists: Vec<ListKind>,
    code: Option<Option<HighlightLines<'static>>>,
    link: Option<String>,
    table: Option<Table>,
    /// A list marker was just written and no item content yet
    fresh_item: bool,
    /// A block just closed; the next one gets a blank separator line
    pending_gap: bool,
}

impl Renderer {
    fn new(palette: Palette) -> Self {
        Self {
            palette,
            lines: Vec::new(),
            inline: Vec::new(),
            quote_depth: 0,
            lists: Vec::new(),
            code: None,
            link: None,
            table: None,
            fresh_item: false,
            pending_gap: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn style(&self) -> Style {
        self.inline
            .iter()
            .fold(Style::default().fg(self.palette.text), |acc, s| acc.patch(*s))
    }

    fn muted(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }

    /// Start a fresh line, carrying the block-quote gutter.
    fn new_line(&mut self) {
        let mut line = Line::default();
        for _ in 0..self.quote_depth {
            line.push_span(Span::styled("│ ", self.muted()));
        }
        self.lines.push(line);
    }

    fn push(&mut self, span: Span<'static>) {
        if self.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.lines.last_mut() {
            line.push_span(span);
        }
    }

    fn begin_block(&mut self) {
        if self.pending_gap && !self.lines.is_empty() {
            self.new_line();
        }
        self.pending_gap = false;
    }

    fn event(&mut self, event: Event<'_>) {
        if let Some(table) = self.table.as_mut() {
            match event {
                Event::Text(t) | Event::Code(t) => {
                    table.cell.push_str(&t);
                    return;
                }
                Event::Start(_) | Event::End(_) => {}
                _ => return,
            }
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(t) => self.text(&t),
            Event::Code(c) => {
                let style = Style::default().fg(self.palette.accent).add_modifier(Modifier::BOLD);
                self.push(Span::styled(c.to_string(), style));
            }
            Event::SoftBreak => self.push(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.begin_block();
                self.new_line();
                self.push(Span::styled("─".repeat(32), self.muted()));
                self.pending_gap = true;
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // First paragraph of a list item continues the marker line
                if !std::mem::take(&mut self.fresh_item) {
                    self.begin_block();
                    self.new_line();
                }
            }
            Tag::Heading { level, .. } => {
                self.begin_block();
                self.new_line();
                self.inline.push(heading_style(level, self.palette));
            }
            Tag::BlockQuote(_) => {
                self.begin_block();
                self.quote_depth += 1;
                self.inline.push(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.begin_block();
                let lang = match &kind {
                    CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or(""),
                    CodeBlockKind::Indented => "",
                };
                self.new_line();
                let label = if lang.is_empty() {
                    "┌──".to_string()
                } else {
                    format!("┌── {lang}")
                };
                self.push(Span::styled(label, self.muted()));
                let highlighter = THEME.as_ref().and_then(|theme| {
                    SYNTAXES
                        .find_syntax_by_token(lang)
                        .filter(|_| !lang.is_empty())
                        .map(|syntax| HighlightLines::new(syntax, theme))
                });
                self.code = Some(highlighter);
            }
            Tag::List(first) => {
                if self.lists.is_empty() {
                    self.begin_block();
                }
                self.lists.push(match first {
                    Some(n) => ListKind::Numbered(n),
                    None => ListKind::Bullet,
                });
            }
            Tag::Item => {
                self.new_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(ListKind::Numbered(n)) => {
                        let m = format!("{indent}{n}. ");
                        *n += 1;
                        m
                    }
                    _ => format!("{indent}• "),
                };
                self.push(Span::styled(marker, Style::default().fg(self.palette.accent)));
                self.fresh_item = true;
            }
            Tag::Emphasis => self.inline.push(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.inline.push(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self
                .inline
                .push(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.inline.push(
                    Style::default()
                        .fg(self.palette.accent)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            Tag::Table(_) => {
                self.begin_block();
                self.table = Some(Table::default());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.pending_gap = true,
            TagEnd::Heading(_) => {
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.inline.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.new_line();
                self.push(Span::styled("└──", self.muted()));
                self.pending_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.pending_gap = true;
            }
            TagEnd::Item => self.pending_gap = false,
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link => {
                self.inline.pop();
                if let Some(url) = self.link.take() {
                    self.push(Span::styled(format!(" ({url})"), self.muted()));
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.current.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.current);
                    table.rows.push(row);
                    if matches!(tag, TagEnd::TableHead) {
                        table.header_rows = table.rows.len();
                    }
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.emit_table(table);
                }
                self.pending_gap = true;
            }
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        self.fresh_item = false;
        let text = raw.replace('\t', "    ");
        match self.code.take() {
            Some(Some(mut highlighter)) => {
                for line in LinesWithEndings::from(&text) {
                    self.new_line();
                    self.push(Span::styled("│ ", self.muted()));
                    match highlighter.highlight_line(line, &SYNTAXES) {
                        Ok(ranges) => {
                            for (style, piece) in ranges {
                                let piece = piece.trim_end_matches('\n');
                                if piece.is_empty() {
                                    continue;
                                }
                                let fg = style.foreground;
                                self.push(Span::styled(
                                    piece.to_string(),
                                    Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                                ));
                            }
                        }
                        Err(_) => self.push(Span::raw(line.trim_end_matches('\n').to_string())),
                    }
                }
                self.code = Some(Some(highlighter));
            }
            Some(None) => {
                for line in text.lines() {
                    self.new_line();
                    self.push(Span::styled("│ ", self.muted()));
                    self.push(Span::raw(line.to_string()));
                }
                self.code = Some(None);
            }
            None => {
                let style = self.style();
                self.push(Span::styled(text, style));
            }
        }
    }

    fn emit_table(&mut self, table: Table) {
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                table
                    .rows
                    .iter()
                    .filter_map(|r| r.get(c))
                    .map(|cell| cell.width())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for (i, row) in table.rows.iter().enumerate() {
            self.new_line();
            let header = i < table.header_rows;
            let style = if header {
                self.style().add_modifier(Modifier::BOLD)
            } else {
                self.style()
            };
            for (c, width) in widths.iter().enumerate() {
                if c > 0 {
                    self.push(Span::styled(" │ ", self.muted()));
                }
                let cell = row.get(c).map(String::as_str).unwrap_or("");
                let pad = width.saturating_sub(cell.width());
                self.push(Span::styled(format!("{cell}{}", " ".repeat(pad)), style));
            }
            if header && i + 1 == table.header_rows {
                self.new_line();
                let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
                self.push(Span::styled(rule.join("─┼─"), self.muted()));
            }
        }
    }
}

fn heading_style(level: HeadingLevel, palette: Palette) -> Style {
    let base = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => base.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => base,
        _ => base.fg(palette.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_text_is_bold_accent() {
        let text = render("## Shuttle schedule", Palette::default());
        let span = &text.lines[0].spans[0];
        assert_eq!(span.content, "Shuttle schedule");
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(span.style.fg, Some(Color::Red));
    }

    #[test]
    fn bold_inside_paragraph() {
        let text = render("Shuttles run **every 30 minutes**.", Palette::default());
        let bold = text.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "every 30 minutes")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn paragraphs_are_separated_by_blank_line() {
        let text = render("first\n\nsecond", Palette::default());
        assert_eq!(plain(&text), vec!["first", "", "second"]);
    }

    #[test]
    fn bullet_and_numbered_lists() {
        let text = render("- Library\n- Housing\n\n1. Apply\n2. Enroll", Palette::default());
        assert_eq!(
            plain(&text),
            vec!["• Library", "• Housing", "", "1. Apply", "2. Enroll"]
        );
    }

    #[test]
    fn nested_list_is_indented() {
        let text = render("- Campus\n  - Kigali", Palette::default());
        let lines = plain(&text);
        assert_eq!(lines[0], "• Campus");
        assert_eq!(lines[1], "  • Kigali");
    }

    #[test]
    fn link_url_is_appended() {
        let text = render("See [the portal](https://example.edu)", Palette::default());
        assert_eq!(plain(&text)[0], "See the portal (https://example.edu)");
    }

    #[test]
    fn code_block_is_framed() {
        let text = render("```\nline1\nline2\n```", Palette::default());
        let lines = plain(&text);
        assert_eq!(lines[0], "┌──");
        assert_eq!(lines[1], "│ line1");
        assert_eq!(lines[2], "│ line2");
        assert_eq!(lines[3], "└──");
    }

    #[test]
    fn highlighted_code_keeps_text() {
        let text = render("```rust\nlet x = 1;\n```", Palette::default());
        let lines = plain(&text);
        assert_eq!(lines[0], "┌── rust");
        assert_eq!(lines[1], "│ let x = 1;");
    }

    #[test]
    fn quote_has_gutter() {
        let text = render("> Quiet hours after 10pm", Palette::default());
        assert_eq!(plain(&text)[0], "│ Quiet hours after 10pm");
    }

    #[test]
    fn table_columns_align() {
        let md = "| Day | Hours |\n|---|---|\n| Mon | 8-22 |\n| Saturday | 10-18 |";
        let text = render(md, Palette::default());
        let lines = plain(&text);
        assert_eq!(lines[0], "Day      │ Hours");
        assert_eq!(lines[1], "─────────┼──────");
        assert_eq!(lines[2], "Mon      │ 8-22 ");
        assert_eq!(lines[3], "Saturday │ 10-18");
    }

    #[test]
    fn tabs_become_spaces() {
        let text = render("```\n\tindented\n```", Palette::default());
        assert!(plain(&text).iter().all(|l| !l.contains('\t')));
        assert!(plain(&text)[1].starts_with("│     indented"));
    }
}
