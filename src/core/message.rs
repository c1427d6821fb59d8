//! # Conversation Messages
//!
//! A `Message` is one bubble in the transcript. Once appended to the
//! [`App`](crate::core::state::App) it is never edited; the list only grows.

use chrono::{DateTime, Utc};

use crate::api::{ChatResponse, Source, Suggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Creation-time derived id, unique within one run.
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Citations (assistant only). Empty means none.
    pub sources: Vec<Source>,
    /// Suggestions that came with this answer. Empty means none.
    pub suggestions: Vec<Suggestion>,
    pub follow_up: Option<String>,
}

impl Message {
    pub fn user(id: String, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::User,
            content,
            timestamp,
            sources: Vec::new(),
            suggestions: Vec::new(),
            follow_up: None,
        }
    }

    /// Assistant turn built from a backend answer.
    pub fn assistant(id: String, response: &ChatResponse, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: response.answer.clone(),
            timestamp,
            sources: response.sources.clone(),
            suggestions: response.suggestions.clone(),
            follow_up: response
                .follow_up
                .clone()
                .filter(|f| !f.trim().is_empty()),
        }
    }

    /// Synthetic assistant turn shown when a request fails.
    pub fn apology(id: String, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content,
            timestamp,
            sources: Vec::new(),
            suggestions: Vec::new(),
            follow_up: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn has_sources(&self) -> bool {
        self.role == Role::Assistant && !self.sources.is_empty()
    }
}

/// Human label for how long ago `timestamp` was, relative to `now`.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - timestamp).num_seconds();
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{} min ago", secs / 60)
    } else if secs < 86_400 {
        format!("{} h ago", secs / 3600)
    } else {
        let days = secs / 86_400;
        if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{days} days ago")
        }
    }
}
