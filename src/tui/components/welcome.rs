//! # WelcomeScreen Component
//!
//! Shown instead of the transcript while no message exists: a greeting,
//! four quick-question buttons and a tip. Choosing a button sends its
//! question exactly as if it had been typed.
//!
//! Buttons sit in a 2×2 grid, or a single column on narrow terminals.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::Component;

pub struct QuickQuestion {
    pub icon: &'static str,
    pub question: &'static str,
}

pub const QUICK_QUESTIONS: [QuickQuestion; 4] = [
    QuickQuestion {
        icon: "🚌",
        question: "What are the shuttle bus timings?",
    },
    QuickQuestion {
        icon: "🎓",
        question: "What programs does CMU-Africa offer?",
    },
    QuickQuestion {
        icon: "📚",
        question: "What are the library hours?",
    },
    QuickQuestion {
        icon: "🏠",
        question: "Tell me about housing options",
    },
];

pub const GREETING: &str = "Welcome to CMU-Africa!";
const SUBTITLE: &str = "I'm here to help you navigate campus life. Ask me anything!";
const TIP: &str = "💡 Tip: I can help with academics, transportation, housing, events, and more!";

const MAX_CONTENT_WIDTH: u16 = 84;
/// Below this content width the grid collapses to one column
const TWO_COLUMN_MIN: u16 = 60;
const HEADING_HEIGHT: u16 = 4;
const TIP_HEIGHT: u16 = 2;

pub struct WelcomeScreen {
    /// Button highlighted by Tab focus or mouse hover
    pub focused: Option<usize>,
}

/// Where each piece of the welcome screen lands for a given area.
#[derive(Debug, Clone, PartialEq)]
pub struct WelcomeLayout {
    pub heading: Rect,
    /// Button rectangles, in `QUICK_QUESTIONS` order
    pub buttons: Vec<Rect>,
    pub tip: Rect,
    pub columns: u16,
}

fn button_text(q: &QuickQuestion) -> String {
    format!("{} {}", q.icon, q.question)
}

impl WelcomeScreen {
    pub fn new(focused: Option<usize>) -> Self {
        Self { focused }
    }

    pub fn layout(area: Rect) -> WelcomeLayout {
        let content_w = area.width.min(MAX_CONTENT_WIDTH);
        let columns: u16 = if content_w >= TWO_COLUMN_MIN { 2 } else { 1 };
        let button_w = if columns == 2 {
            (content_w - 2) / 2
        } else {
            content_w
        };
        // Border (2) + horizontal padding (2)
        let text_w = usize::from(button_w.saturating_sub(4).max(1));
        let text_rows = QUICK_QUESTIONS
            .iter()
            .map(|q| textwrap::wrap(&button_text(q), text_w).len() as u16)
            .max()
            .unwrap_or(1);
        let button_h = text_rows + 2;
        let grid_rows = (QUICK_QUESTIONS.len() as u16).div_ceil(columns);
        let grid_h = grid_rows * button_h + grid_rows.saturating_sub(1);

        let total = HEADING_HEIGHT + grid_h + TIP_HEIGHT;
        let left = area.x + (area.width - content_w) / 2;
        let top = area.y + area.height.saturating_sub(total) / 2;

        let buttons = (0..QUICK_QUESTIONS.len() as u16)
            .map(|i| {
                let (row, col) = (i / columns, i % columns);
                Rect::new(
                    left + col * (button_w + 2),
                    top + HEADING_HEIGHT + row * (button_h + 1),
                    button_w,
                    button_h,
                )
            })
            .collect();

        WelcomeLayout {
            heading: Rect::new(left, top, content_w, HEADING_HEIGHT),
            buttons,
            tip: Rect::new(left, top + HEADING_HEIGHT + grid_h, content_w, TIP_HEIGHT),
            columns,
        }
    }

    /// Buttons fully visible inside `area`, for mouse hit testing.
    pub fn button_rects(area: Rect) -> Vec<(usize, Rect)> {
        Self::layout(area)
            .buttons
            .into_iter()
            .enumerate()
            .filter(|(_, r)| area.contains(r.as_position()) && r.bottom() <= area.bottom())
            .collect()
    }
}

impl Component for WelcomeScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let layout = Self::layout(area);

        let heading = Paragraph::new(vec![
            Line::from("🤖"),
            Line::from(Span::styled(
                GREETING,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(heading, layout.heading.intersection(area));

        for (i, rect) in Self::button_rects(area) {
            let focused = self.focused == Some(i);
            let border = if focused {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let text_w = usize::from(rect.width.saturating_sub(4).max(1));
            let lines: Vec<Line> = textwrap::wrap(&button_text(&QUICK_QUESTIONS[i]), text_w)
                .into_iter()
                .map(|l| Line::from(l.into_owned()))
                .collect();
            let button = Paragraph::new(lines)
                .style(if focused {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                })
                .block(
                    Block::bordered()
                        .border_type(BorderType::Rounded)
                        .border_style(border)
                        .padding(Padding::horizontal(1)),
                );
            frame.render_widget(button, rect);
        }

        let tip = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(TIP, Style::default().fg(Color::DarkGray))),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(tip, layout.tip.intersection(area));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_four_questions_cover_campus_topics() {
        let all: Vec<&str> = QUICK_QUESTIONS.iter().map(|q| q.question).collect();
        assert!(all[0].contains("shuttle"));
        assert!(all[1].contains("programs"));
        assert!(all[2].contains("library hours"));
        assert!(all[3].contains("housing"));
    }

    #[test]
    fn test_wide_terminal_uses_grid() {
        let layout = WelcomeScreen::layout(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.buttons[0].y, layout.buttons[1].y);
        assert!(layout.buttons[2].y > layout.buttons[0].y);
        assert_eq!(layout.buttons[0].x, layout.buttons[2].x);
    }

    #[test]
    fn test_narrow_terminal_stacks_buttons() {
        let layout = WelcomeScreen::layout(Rect::new(0, 0, 40, 40));
        assert_eq!(layout.columns, 1);
        for pair in layout.buttons.windows(2) {
            assert!(pair[1].y > pair[0].y);
        }
    }

    #[test]
    fn test_clipped_buttons_are_not_clickable() {
        let rects = WelcomeScreen::button_rects(Rect::new(0, 0, 40, 12));
        assert!(rects.len() < QUICK_QUESTIONS.len());
        for (_, r) in rects {
            assert!(r.bottom() <= 12);
        }
    }

    #[test]
    fn test_render_shows_greeting_and_questions() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut screen = WelcomeScreen::new(Some(0));
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains(GREETING));
        assert!(text.contains("What are the library hours?"));
        assert!(text.contains("Tell me about housing options"));
    }
}
