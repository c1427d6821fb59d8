//! # MessageList Component
//!
//! Scrollable view of the transcript.
//!
//! ## Responsibilities
//!
//! - Render the visible `ChatBubble`s into a `ScrollView`
//! - Cache per-message heights so long transcripts stay cheap
//! - Glide to the newest message whenever the transcript grows
//! - Show a typing indicator while a request is in flight
//! - Expose sources-toggle rectangles for mouse hit testing
//!
//! ## Architecture
//!
//! `MessageList` is created each frame and wraps `&mut MessageListState`
//! (persistent) plus the transcript and clock (props). `render` takes
//! `&mut self`, so it updates the layout cache and scroll offset in place.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::Message;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::chat_bubble::ChatBubble;
use crate::tui::event::TuiEvent;

/// Rows taken by the typing indicator (dots + spacer).
pub const INDICATOR_HEIGHT: u16 = 2;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, follow the newest content
    pub stick_to_bottom: bool,
    /// Moving toward the bottom a few rows per frame
    pub gliding: bool,
    /// Currently selected message index (keyboard navigation)
    pub selected_index: Option<usize>,
    /// Messages whose sources list is open
    pub expanded: HashSet<usize>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Canvas height of the last frame, typing indicator included
    pub content_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            gliding: false,
            selected_index: None,
            expanded: HashSet::new(),
            viewport_height: 0,
            content_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage following once the user has scrolled back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll the viewport so the selected message is fully visible.
    /// If the message is taller than the viewport, align its top edge.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        if idx >= self.layout.prefix_heights.len() {
            return;
        }

        let item_top = self.layout.top_of(idx);
        let item_bottom = self.layout.prefix_heights[idx];
        let offset_y = self.scroll_state.offset().y;

        if item_top < offset_y || item_bottom - item_top > self.viewport_height {
            self.scroll_state.set_offset(Position { x: 0, y: item_top });
            self.stick_to_bottom = false;
            self.gliding = false;
        } else if item_bottom > offset_y + self.viewport_height {
            let new_y = item_bottom.saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            self.stick_to_bottom = new_y >= self.max_offset();
        }
    }

    /// Up: from nothing selected, start at the newest message.
    pub fn select_prev(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(i) => i.saturating_sub(1).min(count - 1),
            None => count - 1,
        });
        self.scroll_to_selected();
    }

    pub fn select_next(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(i) => (i + 1).min(count - 1),
            None => count - 1,
        });
        self.scroll_to_selected();
    }

    /// Open or close the sources list of message `idx`.
    pub fn toggle_sources(&mut self, idx: usize) {
        if !self.expanded.remove(&idx) {
            self.expanded.insert(idx);
        }
    }

    /// Screen rectangle of every visible sources toggle, as rendered last
    /// frame into `area`.
    pub fn toggle_rects(&self, area: Rect) -> Vec<(usize, Rect)> {
        let offset = self.scroll_state.offset().y;
        let width = area.width.saturating_sub(1);
        self.layout
            .toggle_rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let canvas_y = self.layout.top_of(i) + (*row)?;
                let rel = canvas_y.checked_sub(offset)?;
                (rel < area.height).then(|| (i, Rect::new(area.x, area.y + rel, width, 1)))
            })
            .collect()
    }
}

/// Halve the remaining distance each frame, always moving at least one row.
pub fn glide_step(y: u16, target: u16) -> u16 {
    if y >= target {
        return target;
    }
    y + (target - y).div_ceil(2)
}

/// Scrollable transcript component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
    pub is_loading: bool,
    pub spinner_frame: usize,
    pub now: DateTime<Utc>,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [Message],
        is_loading: bool,
        spinner_frame: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            state,
            messages,
            is_loading,
            spinner_frame,
            now,
        }
    }

    fn typing_indicator(&self) -> Paragraph<'static> {
        let active = self.spinner_frame % 3;
        let mut spans = vec![Span::styled(" 🤖 ", Style::default().fg(Color::Gray))];
        for i in 0..3 {
            let style = if i == active {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(" ●", style));
        }
        Paragraph::new(Line::from(spans))
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // scrollbar column
        let count = self.messages.len();

        // 1. Layout cache
        let grew = count > self.state.layout.message_count;
        {
            let expanded = &self.state.expanded;
            let layout = &mut self.state.layout;
            let reusable = layout.reusable_count(count, content_width, expanded);
            layout.heights.truncate(reusable);
            layout.toggle_rows.truncate(reusable);
            for (i, message) in self.messages.iter().enumerate().skip(reusable) {
                let bubble = ChatBubble::new(message, expanded.contains(&i), false, self.now);
                layout.heights.push(bubble.height(content_width));
                layout.toggle_rows.push(bubble.toggle_row(content_width));
            }
            layout.rebuild_prefix_heights();
            layout.update_metadata(count, content_width, expanded);
        }
        if grew {
            self.state.stick_to_bottom = true;
            self.state.gliding = true;
        }

        let total_height = self.state.layout.total();
        self.state.content_height = self.state.layout.content_height(self.is_loading);
        self.state.viewport_height = area.height;

        // 2. Scroll offset: follow (gliding or snapping) or clamp
        if self.state.stick_to_bottom {
            let max_y = self.state.max_offset();
            let y = self.state.scroll_state.offset().y.min(max_y);
            let next = if self.state.gliding {
                glide_step(y, max_y)
            } else {
                max_y
            };
            if next >= max_y {
                self.state.gliding = false;
            }
            self.state.scroll_state.set_offset(Position { x: 0, y: next });
        } else {
            self.state.gliding = false;
            self.state.clamp_scroll();
        }

        // 3. Render visible bubbles
        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, self.state.content_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible {
            let rect = Rect::new(
                0,
                self.state.layout.top_of(i),
                content_width,
                self.state.layout.heights[i],
            );
            let bubble = ChatBubble::new(
                &self.messages[i],
                self.state.expanded.contains(&i),
                self.state.selected_index == Some(i),
                self.now,
            );
            scroll_view.render_widget(bubble, rect);
        }

        if self.is_loading {
            scroll_view.render_widget(
                self.typing_indicator(),
                Rect::new(0, total_height, content_width, 1),
            );
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Handled on the state rather than `MessageList`, which is rebuilt each frame.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    /// Sources toggle row of each message, relative to its top
    pub toggle_rows: Vec<Option<u16>>,
    message_count: usize,
    content_width: u16,
    /// Heights depend on which sources lists are open.
    cached_expanded: HashSet<usize>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            toggle_rows: Vec::new(),
            message_count: 0,
            content_width: 0,
            cached_expanded: HashSet::new(),
        }
    }

    /// Messages never change once appended, so the cache stays valid up to
    /// the first toggled message unless the width changed.
    pub fn reusable_count(
        &self,
        message_count: usize,
        content_width: u16,
        expanded: &HashSet<usize>,
    ) -> usize {
        if self.content_width != content_width || message_count < self.message_count {
            return 0;
        }
        let cached = self.heights.len().min(message_count);
        match expanded.symmetric_difference(&self.cached_expanded).min() {
            Some(&earliest) => earliest.min(cached),
            None => cached,
        }
    }

    pub fn update_metadata(
        &mut self,
        message_count: usize,
        content_width: u16,
        expanded: &HashSet<usize>,
    ) {
        self.message_count = message_count;
        self.content_width = content_width;
        self.cached_expanded = expanded.clone();
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Rows the scroll view needs: every message plus the typing indicator.
    pub fn content_height(&self, is_loading: bool) -> u16 {
        let indicator = if is_loading { INDICATOR_HEIGHT } else { 0 };
        self.total().saturating_add(indicator)
    }

    pub fn top_of(&self, idx: usize) -> u16 {
        match idx {
            0 => 0,
            i => self.prefix_heights.get(i - 1).copied().unwrap_or_else(|| self.total()),
        }
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatResponse, Source};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn transcript(turns: usize) -> Vec<Message> {
        let now = Utc::now();
        let mut out = Vec::new();
        for t in 0..turns {
            out.push(Message::user(format!("u{t}"), format!("question {t}"), now));
            let response = ChatResponse {
                answer: format!("answer {t}"),
                sources: vec![Source {
                    id: "kb-1".into(),
                    title: "Campus Guide".into(),
                    snippet: "Everything about campus.".into(),
                    category: "general".into(),
                }],
                suggestions: vec![],
                follow_up: None,
            };
            out.push(Message::assistant(format!("a{t}"), &response, now));
        }
        out
    }

    fn draw(state: &mut MessageListState, messages: &[Message], loading: bool, w: u16, h: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(state, messages, loading, 0, Utc::now()).render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_glide_step_halves_distance() {
        assert_eq!(glide_step(0, 10), 5);
        assert_eq!(glide_step(5, 10), 8);
        assert_eq!(glide_step(9, 10), 10);
        assert_eq!(glide_step(10, 10), 10);
        assert_eq!(glide_step(12, 10), 10);
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        let none = HashSet::new();
        cache.heights = vec![1; 5];
        cache.update_metadata(5, 80, &none);

        assert_eq!(cache.reusable_count(5, 80, &none), 5);
        // Appended message: only the new one is measured
        assert_eq!(cache.reusable_count(6, 80, &none), 5);
        // Resize invalidates everything
        assert_eq!(cache.reusable_count(5, 40, &none), 0);
        // Fewer messages than cached cannot happen in an append-only log,
        // but must not reuse stale rows
        assert_eq!(cache.reusable_count(3, 80, &none), 0);
    }

    #[test]
    fn test_expansion_toggle_invalidates_from_toggled_index() {
        let mut cache = LayoutCache::new();
        let none = HashSet::new();
        cache.heights = vec![3, 3, 3, 3];
        cache.update_metadata(4, 80, &none);

        let expanded = HashSet::from([1]);
        assert_eq!(cache.reusable_count(4, 80, &expanded), 1);
    }

    #[test]
    fn test_visible_range_buffers_half_a_viewport() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![10; 10];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.visible_range(0, 10), 0..2);
        assert_eq!(cache.visible_range(50, 10), 4..7);
        assert_eq!(cache.top_of(3), 30);
        assert_eq!(cache.total(), 100);
    }

    #[test]
    fn test_content_height_saturates_on_huge_transcripts() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![u16::MAX - 1, 40];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.total(), u16::MAX);
        assert_eq!(cache.content_height(false), u16::MAX);
        assert_eq!(cache.content_height(true), u16::MAX);

        cache.heights = vec![10];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.content_height(true), 10 + INDICATOR_HEIGHT);
    }

    #[test]
    fn test_new_messages_glide_to_bottom() {
        let messages = transcript(4);
        let mut state = MessageListState::new();
        draw(&mut state, &messages, false, 60, 10);
        assert!(state.gliding);
        let first = state.scroll_state.offset().y;
        let max_y = state.content_height - state.viewport_height;
        assert!(first > 0 && first < max_y);

        for _ in 0..16 {
            draw(&mut state, &messages, false, 60, 10);
        }
        assert!(!state.gliding);
        assert_eq!(state.scroll_state.offset().y, max_y);
        assert!(draw(&mut state, &messages, false, 60, 10).contains("answer 3"));
    }

    #[test]
    fn test_typing_indicator_shown_while_loading() {
        let messages = transcript(1);
        let mut state = MessageListState::new();
        for _ in 0..8 {
            draw(&mut state, &messages, true, 60, 20);
        }
        let idle_height = state.layout.total();
        assert_eq!(state.content_height, idle_height + INDICATOR_HEIGHT);
        let text = draw(&mut state, &messages, true, 60, 20);
        assert!(text.contains("●"));
    }

    #[test]
    fn test_scroll_up_unpins_and_down_repins() {
        let messages = transcript(6);
        let mut state = MessageListState::new();
        for _ in 0..16 {
            draw(&mut state, &messages, false, 60, 10);
        }
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn test_selection_walks_from_newest() {
        let messages = transcript(2);
        let mut state = MessageListState::new();
        draw(&mut state, &messages, false, 60, 40);
        state.select_prev(messages.len());
        assert_eq!(state.selected_index, Some(3));
        state.select_prev(messages.len());
        assert_eq!(state.selected_index, Some(2));
        state.select_next(messages.len());
        state.select_next(messages.len());
        assert_eq!(state.selected_index, Some(3));
    }

    #[test]
    fn test_toggle_rects_follow_assistant_messages() {
        let messages = transcript(1);
        let mut state = MessageListState::new();
        let area = Rect::new(0, 0, 60, 40);
        for _ in 0..4 {
            draw(&mut state, &messages, false, 60, 40);
        }
        let rects = state.toggle_rects(area);
        assert_eq!(rects.len(), 1);
        let (idx, rect) = rects[0];
        assert_eq!(idx, 1);
        assert_eq!(rect.y, state.layout.top_of(1) + state.layout.toggle_rows[1].unwrap());

        state.toggle_sources(1);
        let before = state.layout.heights[1];
        let text = draw(&mut state, &messages, false, 60, 40);
        assert!(state.layout.heights[1] > before);
        assert!(text.contains("Hide Sources (1)"));
        state.toggle_sources(1);
        assert!(state.expanded.is_empty());
    }
}
