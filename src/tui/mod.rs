//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (request in flight, transcript gliding): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms and only redraws on events, plus a slow
//!   refresh so relative timestamps ("3 min ago") keep moving.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::Rect;

use crate::api::{ApiError, ChatBackend, ChatRequest, HttpClient};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState, QUICK_QUESTIONS};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::{ClickTarget, target_at};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);
/// Redraw at least this often so relative timestamps stay current.
const CLOCK_REFRESH: Duration = Duration::from_secs(15);

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Browse messages with arrow keys. Typing switches back to Input.
    Cursor,
    /// Text editing in the input box. Esc switches to Cursor.
    Input,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub input_mode: InputMode,
    /// Tab-focused quick question or suggestion pill
    pub focused_choice: Option<usize>,
    /// Clickable regions recorded by the last draw
    pub click_targets: Vec<(Rect, ClickTarget)>,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            input_mode: InputMode::Input, // User expects to type immediately
            focused_choice: None,
            click_targets: Vec::new(),
        }
    }
}

/// Prompts reachable with Tab: the quick questions while the transcript is
/// empty, otherwise the suggestion pills (hidden while loading).
fn choices(app: &App) -> Vec<String> {
    if app.messages().is_empty() {
        QUICK_QUESTIONS.iter().map(|q| q.question.to_string()).collect()
    } else if app.is_loading {
        Vec::new()
    } else {
        app.current_suggestions
            .iter()
            .map(|s| s.prompt.clone())
            .collect()
    }
}

/// Move focus through `len` choices. Stepping past either end returns focus
/// to the input box (`None`).
fn cycle_focus(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (current, forward) {
        (None, true) => Some(0),
        (None, false) => Some(len - 1),
        (Some(i), true) => (i + 1 < len).then_some(i + 1),
        (Some(i), false) => i.checked_sub(1).filter(|&j| j < len),
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter be told apart from Enter;
        // terminals without it ignore the request.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Delivers exactly one outcome per request. If the task ends without
/// settling (panic, runtime shutdown) the drop reports
/// `ApiError::Interrupted`, so the app never stays stuck in loading.
struct TurnGuard {
    tx: Option<mpsc::Sender<Action>>,
}

impl TurnGuard {
    fn new(tx: mpsc::Sender<Action>) -> Self {
        Self { tx: Some(tx) }
    }

    fn settle(mut self, action: Action) {
        if let Some(tx) = self.tx.take()
            && tx.send(action).is_err()
        {
            warn!("Failed to deliver response: receiver dropped");
        }
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!("Request task ended without a result");
            let _ = tx.send(Action::RequestFailed(ApiError::Interrupted));
        }
    }
}

fn spawn_request(
    backend: Arc<dyn ChatBackend>,
    request: ChatRequest,
    tx: mpsc::Sender<Action>,
) -> tokio::task::JoinHandle<()> {
    info!("Spawning chat request (session_id={:?})", request.session_id);
    tokio::spawn(async move {
        let guard = TurnGuard::new(tx);
        let started = Instant::now();
        let result = backend.send_message(&request).await;
        match &result {
            Ok(response) => info!(
                "Response in {}ms (answer_len={}, sources={}, suggestions={})",
                started.elapsed().as_millis(),
                response.answer.len(),
                response.sources.len(),
                response.suggestions.len()
            ),
            Err(e) => warn!("Request failed after {}ms: {}", started.elapsed().as_millis(), e),
        }
        guard.settle(Action::from(result));
    })
}

/// Run an action through the reducer and carry out its effect.
/// Returns true when the app should quit.
fn dispatch(app: &mut App, tui: &mut TuiState, action: Action, tx: &mpsc::Sender<Action>) -> bool {
    match update(app, action) {
        Effect::SpawnRequest(request) => {
            tui.focused_choice = None;
            tui.message_list.selected_index = None;
            spawn_request(app.backend.clone(), request, tx.clone());
            false
        }
        Effect::Quit => true,
        Effect::None => false,
    }
}

fn toggle_sources(app: &App, tui: &mut TuiState, idx: usize) {
    if app.messages().get(idx).is_some_and(|m| m.has_sources()) {
        tui.message_list.toggle_sources(idx);
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn ChatBackend> = match HttpClient::new(config.base_url.clone(), config.timeout) {
        Ok(client) => Arc::new(client),
        Err(e) => return Err(std::io::Error::other(e.to_string())),
    };
    info!(
        "Starting chat (backend={}, timeout={:?}, profile={})",
        config.base_url,
        config.timeout,
        config.profile.is_some()
    );
    let mut app = App::new(backend, config.profile);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Outcomes from request tasks
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut last_draw = start_time;
    let mut needs_redraw = true;

    loop {
        tui.input_box.disabled = app.is_loading;
        tui.input_box.dimmed = matches!(tui.input_mode, InputMode::Cursor);

        let animating = app.is_loading || tui.message_list.gliding;
        if animating || last_draw.elapsed() >= CLOCK_REFRESH {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame, Utc::now()))?;
            last_draw = Instant::now();
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain all pending events before the next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Resize => continue,
                TuiEvent::ForceQuit => {
                    should_quit |= dispatch(&mut app, &mut tui, Action::Quit, &tx);
                    continue;
                }
                TuiEvent::MouseMove(col, row) => {
                    match target_at(&tui.click_targets, col, row) {
                        Some(ClickTarget::Suggestion(i) | ClickTarget::QuickQuestion(i)) => {
                            tui.focused_choice = Some(i);
                        }
                        _ => {}
                    }
                    continue;
                }
                TuiEvent::MouseClick(col, row) => {
                    match target_at(&tui.click_targets, col, row) {
                        Some(ClickTarget::Suggestion(i)) => {
                            if let Some(s) = app.current_suggestions.get(i) {
                                let prompt = s.prompt.clone();
                                should_quit |= dispatch(&mut app, &mut tui, Action::Submit(prompt), &tx);
                            }
                        }
                        Some(ClickTarget::QuickQuestion(i)) => {
                            if let Some(q) = QUICK_QUESTIONS.get(i) {
                                let question = q.question.to_string();
                                should_quit |= dispatch(&mut app, &mut tui, Action::Submit(question), &tx);
                            }
                        }
                        Some(ClickTarget::ToggleSources(i)) => toggle_sources(&app, &mut tui, i),
                        None => {}
                    }
                    continue;
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.message_list.handle_event(&event);
                    continue;
                }
                TuiEvent::FocusNext | TuiEvent::FocusPrev => {
                    let forward = matches!(event, TuiEvent::FocusNext);
                    tui.focused_choice =
                        cycle_focus(tui.focused_choice, choices(&app).len(), forward);
                    continue;
                }
                _ => {}
            }

            match tui.input_mode {
                InputMode::Input => {
                    if matches!(event, TuiEvent::Escape) {
                        if tui.focused_choice.take().is_none() && !app.messages().is_empty() {
                            tui.input_mode = InputMode::Cursor;
                            tui.message_list.selected_index = app.messages().len().checked_sub(1);
                            tui.message_list.scroll_to_selected();
                        }
                        continue;
                    }

                    // Enter on a focused choice sends its prompt
                    if matches!(event, TuiEvent::Submit)
                        && let Some(prompt) = tui
                            .focused_choice
                            .and_then(|i| choices(&app).into_iter().nth(i))
                    {
                        should_quit |= dispatch(&mut app, &mut tui, Action::Submit(prompt), &tx);
                        continue;
                    }

                    if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event) {
                        should_quit |= dispatch(&mut app, &mut tui, Action::Submit(text), &tx);
                    }
                }
                InputMode::Cursor => match event {
                    TuiEvent::InputChar(' ') => {
                        if let Some(idx) = tui.message_list.selected_index {
                            toggle_sources(&app, &mut tui, idx);
                        }
                    }
                    TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                        tui.input_mode = InputMode::Input;
                        tui.message_list.selected_index = None;
                        tui.input_box.handle_event(&event);
                    }
                    TuiEvent::Submit | TuiEvent::Escape => {
                        tui.input_mode = InputMode::Input;
                        tui.message_list.selected_index = None;
                    }
                    TuiEvent::CursorUp => tui.message_list.select_prev(app.messages().len()),
                    TuiEvent::CursorDown => tui.message_list.select_next(app.messages().len()),
                    _ => {}
                },
            }
        }

        if should_quit {
            break;
        }

        // Outcomes from request tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, &mut tui, action, &tx) {
                should_quit = true;
            }
        }
        if should_quit {
            break;
        }
    }

    info!("Exiting ({} messages in transcript)", app.messages().len());
    ratatui::restore();
    Ok(())
}
