//! # SuggestionPills Component
//!
//! Caption plus a wrapped row of clickable follow-up prompts from the latest
//! answer. Renders nothing (height 0) for an empty set.
//!
//! ```text
//! 💡 Quick suggestions:
//! ( Show route map ) ( Weekend schedule ) ( Where is the stop? )
//! ```
//!
//! Stateless. Focus (Tab) is owned by the event loop and passed in; the
//! parent reads `pill_rects` to map mouse clicks back to a suggestion.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::api::Suggestion;
use crate::tui::component::Component;

pub const CAPTION: &str = "💡 Quick suggestions:";
/// `( ` + ` )`
const PILL_CHROME: u16 = 4;
const GAP: u16 = 1;

pub struct SuggestionPills<'a> {
    pub suggestions: &'a [Suggestion],
    pub focused: Option<usize>,
}

impl<'a> SuggestionPills<'a> {
    pub fn new(suggestions: &'a [Suggestion], focused: Option<usize>) -> Self {
        Self {
            suggestions,
            focused,
        }
    }

    pub fn height(&self, width: u16) -> u16 {
        if self.suggestions.is_empty() {
            return 0;
        }
        let rows = pill_layout(self.suggestions, width)
            .iter()
            .map(|p| p.row + 1)
            .max()
            .unwrap_or(0);
        1 + rows
    }

    /// Screen rectangle of each pill when rendered into `area`, in
    /// suggestion order. Pills that fall below `area` are omitted.
    pub fn pill_rects(&self, area: Rect) -> Vec<(usize, Rect)> {
        pill_layout(self.suggestions, area.width)
            .into_iter()
            .enumerate()
            .filter(|(_, p)| 1 + p.row < area.height)
            .map(|(i, p)| (i, Rect::new(area.x + p.x, area.y + 1 + p.row, p.width, 1)))
            .collect()
    }
}

/// Position of one pill relative to the first pill row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PillSlot {
    pub row: u16,
    pub x: u16,
    pub width: u16,
}

/// Flow pills left to right, wrapping to a new row when the next one does
/// not fit. A pill wider than the whole row gets a row of its own, clipped.
pub fn pill_layout(suggestions: &[Suggestion], width: u16) -> Vec<PillSlot> {
    let mut slots = Vec::with_capacity(suggestions.len());
    let (mut row, mut x) = (0u16, 0u16);
    for s in suggestions {
        let natural = (s.label.width() as u16).saturating_add(PILL_CHROME);
        let w = natural.min(width.max(1));
        if x > 0 && x + w > width {
            row += 1;
            x = 0;
        }
        slots.push(PillSlot { row, x, width: w });
        x = x.saturating_add(w + GAP);
    }
    slots
}

impl Component for SuggestionPills<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.suggestions.is_empty() || area.height == 0 {
            return;
        }

        let caption = Paragraph::new(Line::from(Span::styled(
            CAPTION,
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(caption, Rect { height: 1, ..area });

        for (i, rect) in self.pill_rects(area) {
            let style = if self.focused == Some(i) {
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::LightRed)
            };
            let label = &self.suggestions[i].label;
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(format!("( {label} )"), style))),
                rect,
            );
        }
    }
}
