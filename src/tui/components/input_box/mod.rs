//! # InputBox Component
//!
//! Multiline question editor with a send affordance.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, Shift+Enter newlines)
//! - Cursor movement across wrapped rows
//! - Emit `Submit` with the trimmed text on Enter
//! - Show a placeholder when empty
//! - Ignore edits and submits while `disabled` (a request is in flight)
//!
//! The buffer and cursor are internal state; `disabled` and `dimmed` are
//! props refreshed by the event loop every frame.

mod layout;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use layout::{
    MAX_VISIBLE_ROWS, Row, VERTICAL_OVERHEAD, inner_width, locate, next_char_boundary, offset_at,
    prev_char_boundary, rows,
};

pub const PLACEHOLDER: &str = "Ask me anything about CMU-Africa...";

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed with non-blank text; carries the trimmed text
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    buffer: String,
    /// Cursor as a byte offset into `buffer`
    cursor: usize,
    /// First visible row when the text is taller than the box
    scroll: usize,
    /// Inner width from the last render, used by Up/Down
    last_width: u16,
    /// Prop: a request is in flight
    pub disabled: bool,
    /// Prop: focus is on the transcript (Cursor mode)
    pub dimmed: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll: 0,
            last_width: 76,
            disabled: false,
            dimmed: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// Box height for `area_width`, between 3 and `MAX_VISIBLE_ROWS + 2`.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let count = rows(&self.buffer, inner_width(area_width)).len() as u16;
        count.clamp(1, MAX_VISIBLE_ROWS) + VERTICAL_OVERHEAD
    }

    fn insert(&mut self, s: &str) {
        self.buffer.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    fn move_vertically(&mut self, down: bool) -> bool {
        let rows = rows(&self.buffer, self.last_width);
        let (row, col) = locate(&self.buffer, &rows, self.cursor);
        let target = if down {
            if row + 1 >= rows.len() {
                return false;
            }
            row + 1
        } else {
            if row == 0 {
                return false;
            }
            row - 1
        };
        self.cursor = offset_at(&self.buffer, &rows, target, col);
        true
    }

    /// Keep the cursor row inside the visible window.
    fn follow_cursor(&mut self, rows: &[Row]) {
        let (row, _) = locate(&self.buffer, rows, self.cursor);
        let visible = usize::from(MAX_VISIBLE_ROWS);
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + visible {
            self.scroll = row + 1 - visible;
        }
        let max_scroll = rows.len().saturating_sub(visible);
        self.scroll = self.scroll.min(max_scroll);
    }

    fn border_style(&self) -> Style {
        if self.disabled || self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Red)
        }
    }

    fn send_label(&self) -> Line<'static> {
        let ready = !self.disabled && !self.is_empty();
        let style = if ready {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::from(Span::styled(" ➤ Send ", style)).alignment(Alignment::Right)
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = inner_width(area.width);
        self.last_width = width;
        let rows = rows(&self.buffer, width);
        self.follow_cursor(&rows);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(self.border_style())
            .title(Line::from(" Message ").style(self.border_style()))
            .title_bottom(self.send_label())
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.buffer.is_empty() {
            let placeholder = Paragraph::new(PLACEHOLDER).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(placeholder, inner);
        } else {
            let text_style = if self.disabled {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            let lines: Vec<Line> = rows
                .iter()
                .skip(self.scroll)
                .take(usize::from(MAX_VISIBLE_ROWS))
                .map(|r| Line::from(self.buffer[r.start..r.end].to_string()))
                .collect();
            frame.render_widget(Paragraph::new(lines).style(text_style), inner);
        }

        if rows.len() > usize::from(MAX_VISIBLE_ROWS) {
            let max_scroll = rows.len() - usize::from(MAX_VISIBLE_ROWS);
            let mut state = ScrollbarState::new(max_scroll).position(self.scroll);
            let bar_area = Rect {
                x: area.x + area.width.saturating_sub(1),
                y: area.y + 1,
                width: 1,
                height: area.height.saturating_sub(2),
            };
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                bar_area,
                &mut state,
            );
        }

        if !self.disabled && !self.dimmed {
            let (row, col) = locate(&self.buffer, &rows, self.cursor);
            let y = inner.y + (row - self.scroll) as u16;
            let x = inner.x + col.min(inner.width.saturating_sub(1));
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        let changed = Some(InputEvent::ContentChanged);
        match event {
            TuiEvent::InputChar(c) => {
                let mut tmp = [0u8; 4];
                self.insert(c.encode_utf8(&mut tmp));
                changed
            }
            TuiEvent::Paste(text) => {
                // Terminals paste CRLF on some platforms
                self.insert(&text.replace("\r\n", "\n").replace('\r', "\n"));
                changed
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                changed
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                changed
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                changed
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                changed
            }
            TuiEvent::CursorHome => {
                let start = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
                (start != self.cursor).then(|| {
                    self.cursor = start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let end = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                (end != self.cursor).then(|| {
                    self.cursor = end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorUp => self.move_vertically(false).then_some(InputEvent::ContentChanged),
            TuiEvent::CursorDown => self.move_vertically(true).then_some(InputEvent::ContentChanged),
            TuiEvent::Submit => {
                let text = self.buffer.trim();
                if text.is_empty() {
                    return None;
                }
                let text = text.to_string();
                self.clear();
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
