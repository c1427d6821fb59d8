//! # Application State
//!
//! Core business state for the assistant. Domain logic only; presentation
//! state (scroll, focus, expanded citations) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ChatBackend>     // question-answering service
//! ├── messages: Vec<Message>            // append-only transcript
//! ├── current_suggestions: Vec<..>      // pills from the latest answer
//! ├── is_loading: bool                  // awaiting a response
//! ├── error: Option<String>             // banner text
//! ├── status_message: String            // header status
//! └── profile: Option<UserProfile>      // sent with each request
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::{ChatBackend, Suggestion, UserProfile};
use crate::core::message::Message;

pub const STATUS_READY: &str = "Ready";
pub const STATUS_THINKING: &str = "Thinking…";

pub struct App {
    pub backend: Arc<dyn ChatBackend>,
    messages: Vec<Message>,
    pub current_suggestions: Vec<Suggestion>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub status_message: String,
    pub profile: Option<UserProfile>,
    /// Last id handed out, in unix millis.
    last_id: i64,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, profile: Option<UserProfile>) -> Self {
        Self {
            backend,
            messages: Vec::new(),
            current_suggestions: Vec::new(),
            is_loading: false,
            error: None,
            status_message: String::from(STATUS_READY),
            profile,
            last_id: 0,
        }
    }

    /// The transcript, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Appending is the only mutation the transcript supports.
    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Id for a message created at `now`: its unix millis, bumped past the
    /// previous id when two messages land in the same millisecond.
    pub(crate) fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let id = now.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }

    /// Health endpoint named in the error apology.
    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.backend.base_url())
    }
}
