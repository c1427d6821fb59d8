//! Red box above the input showing the last request error.
//!
//! Replaced by the next failure and cleared by the next send; there is no
//! dismiss key.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

use crate::tui::component::Component;

pub struct ErrorBanner<'a> {
    pub message: &'a str,
}

impl<'a> ErrorBanner<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }

    fn body(&self) -> Paragraph<'a> {
        Paragraph::new(Line::from(vec![
            Span::raw("⚠ "),
            Span::raw(self.message),
        ]))
        .style(Style::default().fg(Color::LightRed))
        .wrap(Wrap { trim: true })
    }

    /// Rows needed at `width`, borders included.
    pub fn height(&self, width: u16) -> u16 {
        self.body().line_count(width.saturating_sub(2)).max(1) as u16 + 2
    }
}

impl Component for ErrorBanner<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let banner = self.body().block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(banner, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_height_includes_borders_and_wraps() {
        let banner = ErrorBanner::new("Failed to process query");
        assert_eq!(banner.height(60), 3);
        assert!(banner.height(14) > 3);
    }

    #[test]
    fn test_renders_message() {
        let mut terminal = Terminal::new(TestBackend::new(80, 3)).unwrap();
        let mut banner = ErrorBanner::new("Failed to get response.");
        terminal.draw(|f| banner.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Failed to get response."));
    }
}
