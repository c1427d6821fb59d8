//! # ChatBubble Component
//!
//! Renders one `Message`. Pure function of its props.
//!
//! ```text
//!                                  ╭──────────────────── You ╮
//!                                  │ What are the shuttle    │
//!                                  │ timings?                │
//!                                  ╰─────────────────────────╯
//!                                                    just now
//! ╭ 🤖 Assistant ───────────────────────────────────────╮
//! │ Shuttles run every 30 minutes.                      │
//! ╰─────────────────────────────────────────────────────╯
//! 📚 Show Sources (1) ▼
//! just now
//! ```
//!
//! User bubbles are plain text, right-aligned and sized to their content.
//! Assistant bubbles are markdown, left-aligned, full width minus a margin.
//! The sources toggle is only present when the answer carries citations.
//!
//! `height` and `render` build the same paragraphs, so the height the
//! message list caches is the height that gets drawn.

use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::message::{Message, Role, relative_time};
use crate::tui::markdown::{self, Palette};

/// Columns kept free on the side opposite the bubble.
const SIDE_MARGIN: u16 = 4;
/// Borders (2) + horizontal padding (2).
const BUBBLE_CHROME: u16 = 4;
const SNIPPET_INDENT: &str = "    ";

pub struct ChatBubble<'a> {
    pub message: &'a Message,
    /// Citations list open (assistant only)
    pub expanded: bool,
    /// Highlighted in Cursor mode
    pub selected: bool,
    /// Reference time for the relative label
    pub now: DateTime<Utc>,
}

struct Parts<'a> {
    bubble: Paragraph<'a>,
    bubble_x: u16,
    bubble_w: u16,
    bubble_h: u16,
    sources: Option<Vec<Line<'a>>>,
    time: Line<'a>,
}

impl<'a> ChatBubble<'a> {
    pub fn new(message: &'a Message, expanded: bool, selected: bool, now: DateTime<Utc>) -> Self {
        Self {
            message,
            expanded,
            selected,
            now,
        }
    }

    /// Total rows: bubble, sources block, time label, one spacer row.
    pub fn height(&self, width: u16) -> u16 {
        let parts = self.parts(width);
        let sources_h = parts.sources.as_ref().map_or(0, |l| rows_u16(l.len()));
        parts.bubble_h.saturating_add(sources_h).saturating_add(2)
    }

    /// Row (relative to the top of the message) of the sources toggle.
    pub fn toggle_row(&self, width: u16) -> Option<u16> {
        self.message
            .has_sources()
            .then(|| self.parts(width).bubble_h)
    }

    fn border_style(&self) -> Style {
        if self.selected {
            Style::default().fg(Color::Cyan)
        } else if self.message.role == Role::User {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    fn parts(&self, width: u16) -> Parts<'a> {
        let width = width.max(BUBBLE_CHROME + 1);
        let time_style = Style::default().fg(Color::DarkGray);
        let label = relative_time(self.message.timestamp, self.now);

        match self.message.role {
            Role::User => {
                let content = self.message.content.as_str();
                let natural = rows_u16(content.lines().map(|l| l.width()).max().unwrap_or(0));
                let max_inner = width
                    .saturating_sub(SIDE_MARGIN + BUBBLE_CHROME)
                    .max(1);
                let bubble_w = natural.clamp(1, max_inner) + BUBBLE_CHROME;
                let (bubble, bubble_h) = framed(
                    Paragraph::new(content).wrap(Wrap { trim: false }),
                    Block::bordered()
                        .border_type(BorderType::Rounded)
                        .border_style(self.border_style())
                        .title(Line::from(" You ").alignment(Alignment::Right))
                        .padding(Padding::horizontal(1)),
                    bubble_w,
                );
                Parts {
                    bubble,
                    bubble_x: width.saturating_sub(bubble_w),
                    bubble_w,
                    bubble_h,
                    sources: None,
                    time: Line::from(Span::styled(format!("{label} "), time_style))
                        .alignment(Alignment::Right),
                }
            }
            Role::Assistant => {
                let mut text = markdown::render(&self.message.content, Palette::default());
                if text.lines.is_empty() {
                    text = Text::from(" ");
                }
                if let Some(follow_up) = &self.message.follow_up {
                    text.lines.push(Line::default());
                    text.lines.push(Line::from(Span::styled(
                        format!("↪ {follow_up}"),
                        Style::default()
                            .fg(Color::Gray)
                            .add_modifier(Modifier::ITALIC),
                    )));
                }
                let bubble_w = width.saturating_sub(SIDE_MARGIN).max(BUBBLE_CHROME + 1);
                let (bubble, bubble_h) = framed(
                    Paragraph::new(text).wrap(Wrap { trim: false }),
                    Block::bordered()
                        .border_type(BorderType::Rounded)
                        .border_style(self.border_style())
                        .title(" 🤖 Assistant ")
                        .padding(Padding::horizontal(1)),
                    bubble_w,
                );
                Parts {
                    bubble,
                    bubble_x: 0,
                    bubble_w,
                    bubble_h,
                    sources: self
                        .message
                        .has_sources()
                        .then(|| self.source_lines(width)),
                    time: Line::from(Span::styled(format!(" {label}"), time_style)),
                }
            }
        }
    }

    fn source_lines(&self, width: u16) -> Vec<Line<'a>> {
        let sources = &self.message.sources;
        let toggle = if self.expanded {
            format!("📚 Hide Sources ({}) ▲", sources.len())
        } else {
            format!("📚 Show Sources ({}) ▼", sources.len())
        };
        let mut lines = vec![Line::from(Span::styled(
            toggle,
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        ))];
        if !self.expanded {
            return lines;
        }

        let wrap_w = usize::from(width.max(8));
        let options = textwrap::Options::new(wrap_w)
            .initial_indent(SNIPPET_INDENT)
            .subsequent_indent(SNIPPET_INDENT);
        for (i, source) in sources.iter().enumerate() {
            lines.extend(citation_header(i + 1, &source.title, &source.category, wrap_w));
            for row in textwrap::wrap(&source.snippet, &options) {
                lines.push(Line::from(Span::styled(
                    row.into_owned(),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
        lines
    }
}

/// `[n] title  ‹category›`, wrapped to `wrap_w`. The tag follows the last
/// title row when it fits, otherwise it gets an indented row of its own.
fn citation_header<'a>(n: usize, title: &str, category: &str, wrap_w: usize) -> Vec<Line<'a>> {
    let prefix = format!("[{n}] ");
    let tag = format!("‹{category}›");
    let title_style = Style::default().add_modifier(Modifier::BOLD);
    let tag_style = Style::default().fg(Color::LightRed);

    let options = textwrap::Options::new(wrap_w)
        .initial_indent(&prefix)
        .subsequent_indent(SNIPPET_INDENT);
    let rows = textwrap::wrap(title, &options);

    let mut lines: Vec<Line<'a>> = Vec::with_capacity(rows.len() + 1);
    for (r, row) in rows.iter().enumerate() {
        let (lead, rest) = if r == 0 {
            row.split_at(prefix.len().min(row.len()))
        } else {
            row.split_at(SNIPPET_INDENT.len().min(row.len()))
        };
        let lead_style = if r == 0 {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(lead.to_string(), lead_style),
            Span::styled(rest.to_string(), title_style),
        ]));
    }

    let fits = lines
        .last()
        .is_some_and(|last| last.width() + 2 + tag.width() <= wrap_w);
    if let Some(last) = lines.last_mut().filter(|_| fits) {
        last.spans.push(Span::raw("  "));
        last.spans.push(Span::styled(tag, tag_style));
    } else {
        lines.push(Line::from(vec![
            Span::raw(SNIPPET_INDENT),
            Span::styled(tag, tag_style),
        ]));
    }
    lines
}

fn rows_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Put `body` inside `block` and return it with its total height at
/// `outer_w`. Rows are counted on the bare body at the inner width.
fn framed<'a>(body: Paragraph<'a>, block: Block<'a>, outer_w: u16) -> (Paragraph<'a>, u16) {
    let rows = rows_u16(body.line_count(outer_w.saturating_sub(BUBBLE_CHROME)));
    (body.block(block), rows.max(1).saturating_add(2))
}

impl Widget for ChatBubble<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let parts = self.parts(area.width);
        let mut y = area.y;
        let bottom = area.bottom();

        let bubble_rect = Rect::new(area.x + parts.bubble_x, y, parts.bubble_w, parts.bubble_h)
            .intersection(area);
        parts.bubble.render(bubble_rect, buf);
        y = y.saturating_add(parts.bubble_h);

        if let Some(lines) = parts.sources {
            let h = rows_u16(lines.len());
            let rect = Rect::new(area.x, y.min(bottom), area.width, h).intersection(area);
            Paragraph::new(lines).render(rect, buf);
            y = y.saturating_add(h);
        }

        if y < bottom {
            Paragraph::new(parts.time).render(Rect::new(area.x, y, area.width, 1), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatResponse, Source};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn answer_with_sources(n: usize) -> Message {
        let response = ChatResponse {
            answer: "Shuttles run every 30 minutes.".into(),
            sources: (0..n)
                .map(|i| Source {
                    id: i.to_string(),
                    title: format!("Transport Guide {}", i + 1),
                    snippet: "The campus shuttle leaves from the main gate.".into(),
                    category: "transport".into(),
                })
                .collect(),
            suggestions: vec![],
            follow_up: None,
        };
        Message::assistant("2".into(), &response, Utc::now())
    }

    fn draw(bubble: ChatBubble, width: u16) -> Vec<String> {
        let height = bubble.height(width);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| f.render_widget(bubble, f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_user_bubble_is_right_aligned_and_sized_to_content() {
        let msg = Message::user("1".into(), "Hi".into(), Utc::now());
        let bubble = ChatBubble::new(&msg, false, false, Utc::now());
        // 1 content row + 2 borders, time label, spacer
        assert_eq!(bubble.height(40), 5);
        let rows = draw(bubble, 40);
        assert!(rows[1].trim_end().ends_with("│ Hi │"));
        assert!(rows[1].starts_with("    "));
        assert!(rows[3].trim_end().ends_with("just now"));
    }

    #[test]
    fn test_user_text_wraps_inside_margin() {
        let msg = Message::user("1".into(), "word ".repeat(20), Utc::now());
        let bubble = ChatBubble::new(&msg, false, false, Utc::now());
        assert!(bubble.height(30) > 5);
    }

    #[test]
    fn test_assistant_collapsed_sources_show_toggle_only() {
        let msg = answer_with_sources(1);
        let bubble = ChatBubble::new(&msg, false, false, Utc::now());
        assert_eq!(bubble.toggle_row(60), Some(3));
        // bubble 3 + toggle 1 + time 1 + spacer 1
        assert_eq!(bubble.height(60), 6);
        let rows = draw(bubble, 60);
        assert!(rows[1].contains("Shuttles run every 30 minutes."));
        assert!(rows[3].contains("Show Sources (1)"));
        assert!(!rows.iter().any(|r| r.contains("Transport Guide")));
    }

    #[test]
    fn test_expanded_sources_list_citations() {
        let msg = answer_with_sources(2);
        let collapsed = ChatBubble::new(&msg, false, false, Utc::now()).height(60);
        let bubble = ChatBubble::new(&msg, true, false, Utc::now());
        // Each citation: header row + one snippet row at this width
        assert_eq!(bubble.height(60), collapsed + 4);
        let rows = draw(bubble, 60);
        let joined = rows.join("\n");
        assert!(joined.contains("Hide Sources (2)"));
        assert!(joined.contains("[1] Transport Guide 1"));
        assert!(joined.contains("[2] Transport Guide 2"));
        assert!(joined.contains("‹transport›"));
        assert!(joined.contains("    The campus shuttle leaves from the main gate."));
    }

    #[test]
    fn test_long_citation_title_wraps_and_keeps_category() {
        let response = ChatResponse {
            answer: "See the handbook.".into(),
            sources: vec![Source {
                id: "kb-1".into(),
                title: "Graduate Student Handbook Section Four Academic Integrity".into(),
                snippet: "Cite your work.".into(),
                category: "academics".into(),
            }],
            suggestions: vec![],
            follow_up: None,
        };
        let msg = Message::assistant("4".into(), &response, Utc::now());
        let collapsed = ChatBubble::new(&msg, false, false, Utc::now()).height(30);
        let bubble = ChatBubble::new(&msg, true, false, Utc::now());
        let expanded = bubble.height(30);
        // Header spills over several rows, plus the snippet row
        assert!(expanded >= collapsed + 3, "{expanded} vs {collapsed}");
        let rows = draw(bubble, 30);
        assert!(rows.iter().any(|r| r.contains("‹academics›")));
        assert!(rows.iter().any(|r| r.starts_with("[1] Graduate")));
        assert!(rows.iter().any(|r| r.contains("Integrity")));
    }

    #[test]
    fn test_huge_answer_height_saturates() {
        let response = ChatResponse {
            answer: "line\n\n".repeat(70_000),
            sources: vec![],
            suggestions: vec![],
            follow_up: None,
        };
        let msg = Message::assistant("5".into(), &response, Utc::now());
        assert_eq!(ChatBubble::new(&msg, false, false, Utc::now()).height(60), u16::MAX);
    }

    #[test]
    fn test_no_sources_no_toggle() {
        let msg = answer_with_sources(0);
        let bubble = ChatBubble::new(&msg, false, false, Utc::now());
        assert_eq!(bubble.toggle_row(60), None);
        assert_eq!(bubble.height(60), 5);
    }

    #[test]
    fn test_follow_up_is_rendered() {
        let response = ChatResponse {
            answer: "Yes.".into(),
            sources: vec![],
            suggestions: vec![],
            follow_up: Some("Want the weekend schedule too?".into()),
        };
        let msg = Message::assistant("3".into(), &response, Utc::now());
        let rows = draw(ChatBubble::new(&msg, false, false, Utc::now()), 60);
        assert!(rows.iter().any(|r| r.contains("↪ Want the weekend schedule too?")));
    }

    #[test]
    fn test_selected_border_is_cyan() {
        let msg = Message::user("1".into(), "Hi".into(), Utc::now());
        let bubble = ChatBubble::new(&msg, false, true, Utc::now());
        assert_eq!(bubble.border_style().fg, Some(Color::Cyan));
    }
}
