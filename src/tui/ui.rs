//! Screen layout.
//!
//! ```text
//! ┌ Header (2) ──────────────────────────────┐
//! │ Welcome screen  or  MessageList          │
//! │ SuggestionPills (only when idle)         │
//! │ ErrorBanner (only with an error)         │
//! │ InputBox (3..7)                          │
//! └ footer (1) ──────────────────────────────┘
//! ```
//!
//! Every frame also records where the clickable things landed, so the event
//! loop can map a mouse click back to a choice without re-deriving layout.

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{
    ErrorBanner, Header, MessageList, SuggestionPills, WelcomeScreen,
};
use crate::tui::{InputMode, TuiState};

pub const FOOTER_BRANDING: &str = concat!(
    "Powered by RAG + OpenAI • CMU-Africa Campus Assistant v",
    env!("CARGO_PKG_VERSION")
);

/// Something a mouse click can activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Suggestion(usize),
    QuickQuestion(usize),
    ToggleSources(usize),
}

/// Topmost target under a screen cell.
pub fn target_at(targets: &[(Rect, ClickTarget)], col: u16, row: u16) -> Option<ClickTarget> {
    targets
        .iter()
        .find(|(rect, _)| rect.contains(Position::new(col, row)))
        .map(|(_, t)| *t)
}

fn footer_hints(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Input => " Enter send • Shift+Enter newline • Tab suggestions • Esc browse • Ctrl+C quit",
        InputMode::Cursor => " ↑↓ select • Space sources • Enter/Esc back to input",
    }
}

pub fn draw_ui(
    frame: &mut Frame,
    app: &App,
    tui: &mut TuiState,
    spinner_frame: usize,
    now: DateTime<Utc>,
) {
    use Constraint::{Length, Min};

    let area = frame.area();
    tui.click_targets.clear();

    let welcome = app.messages().is_empty();
    let visible_suggestions = if app.is_loading {
        &[][..]
    } else {
        app.current_suggestions.as_slice()
    };
    let pills_focus = if welcome { None } else { tui.focused_choice };
    let mut pills = SuggestionPills::new(visible_suggestions, pills_focus);
    let pills_h = pills.height(area.width);
    let banner_h = app
        .error
        .as_deref()
        .map_or(0, |m| ErrorBanner::new(m).height(area.width));
    let input_h = tui.input_box.calculate_height(area.width);

    let [header_area, main_area, pills_area, error_area, input_area, footer_area] =
        Layout::vertical([
            Length(2),
            Min(0),
            Length(pills_h),
            Length(banner_h),
            Length(input_h),
            Length(1),
        ])
        .areas(area);

    Header::new(
        &app.status_message,
        app.is_loading,
        app.backend.base_url(),
        spinner_frame,
    )
    .render(frame, header_area);

    if welcome {
        WelcomeScreen::new(tui.focused_choice).render(frame, main_area);
        tui.click_targets.extend(
            WelcomeScreen::button_rects(main_area)
                .into_iter()
                .map(|(i, r)| (r, ClickTarget::QuickQuestion(i))),
        );
    } else {
        MessageList::new(
            &mut tui.message_list,
            app.messages(),
            app.is_loading,
            spinner_frame,
            now,
        )
        .render(frame, main_area);
        tui.click_targets.extend(
            tui.message_list
                .toggle_rects(main_area)
                .into_iter()
                .map(|(i, r)| (r, ClickTarget::ToggleSources(i))),
        );
    }

    if pills_h > 0 {
        tui.click_targets.extend(
            pills
                .pill_rects(pills_area)
                .into_iter()
                .map(|(i, r)| (r, ClickTarget::Suggestion(i))),
        );
        pills.render(frame, pills_area);
    }

    if let Some(message) = app.error.as_deref() {
        ErrorBanner::new(message).render(frame, error_area);
    }

    tui.input_box.render(frame, input_area);

    // Key hints only when they fit beside the branding
    let dim = Style::default().fg(Color::DarkGray);
    let hints = footer_hints(tui.input_mode);
    let needed = hints.width() + FOOTER_BRANDING.width() + 2;
    if usize::from(footer_area.width) >= needed {
        frame.render_widget(Paragraph::new(Span::styled(hints, dim)), footer_area);
    }
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(format!("{FOOTER_BRANDING} "), dim)))
            .alignment(Alignment::Right),
        footer_area,
    );
}
