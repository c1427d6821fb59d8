//! # Header Component
//!
//! Two-line banner at the top of the screen.
//!
//! ```text
//!  🎓 CMU-Africa Campus Assistant                      ● Ready
//!     Your AI-powered guide to campus life   http://localhost:8001
//! ```
//!
//! Stateless: every field is a prop copied from `App` each frame.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::tui::component::Component;

pub const TITLE: &str = "CMU-Africa Campus Assistant";
pub const TAGLINE: &str = "Your AI-powered guide to campus life";

pub struct Header<'a> {
    pub status: &'a str,
    pub is_loading: bool,
    pub base_url: &'a str,
    /// Spinner frame counter, only read while loading
    pub spinner_frame: usize,
}

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

impl<'a> Header<'a> {
    pub fn new(status: &'a str, is_loading: bool, base_url: &'a str, spinner_frame: usize) -> Self {
        Self {
            status,
            is_loading,
            base_url,
            spinner_frame,
        }
    }

    fn status_span(&self) -> Span<'static> {
        let dot = if self.is_loading {
            SPINNER[self.spinner_frame % SPINNER.len()]
        } else {
            "●"
        };
        let color = if self.is_loading { Color::Yellow } else { Color::LightGreen };
        Span::styled(
            format!("{dot} {} ", self.status),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )
    }
}

impl Component for Header<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let banner = Style::default().bg(Color::Red).fg(Color::White);
        frame.render_widget(Block::default().style(banner), area);

        let left = Paragraph::new(vec![
            Line::from(vec![
                Span::raw(" 🎓 "),
                Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(Span::styled(
                format!("    {TAGLINE}"),
                Style::default().fg(Color::Gray),
            )),
        ]);
        frame.render_widget(left, area);

        let right = Paragraph::new(vec![
            Line::from(self.status_span()),
            Line::from(Span::styled(
                format!("{} ", self.base_url),
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Right);
        frame.render_widget(right, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(header: &mut Header) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 2)).unwrap();
        terminal.draw(|f| header.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_header_shows_title_and_status() {
        let mut header = Header::new("Ready", false, "http://localhost:8001", 0);
        let text = draw(&mut header);
        assert!(text.contains(TITLE));
        assert!(text.contains(TAGLINE));
        assert!(text.contains("● Ready"));
        assert!(text.contains("http://localhost:8001"));
    }

    #[test]
    fn test_header_spins_while_loading() {
        let mut header = Header::new("Thinking…", true, "http://x", 1);
        let text = draw(&mut header);
        assert!(text.contains("◓ Thinking…"));
    }
}
