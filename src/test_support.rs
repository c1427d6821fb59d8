//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{ApiError, ChatBackend, ChatRequest, ChatResponse};
use crate::core::state::App;

pub const STUB_BASE_URL: &str = "http://stub.test";

enum Reply {
    Answer(ChatResponse),
    Fail(ApiError),
    Panic,
}

/// In-memory backend. Replies to every question the same way.
pub struct StubBackend {
    reply: Reply,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::answering(ChatResponse {
            answer: "Stub answer".into(),
            sources: vec![],
            suggestions: vec![],
            follow_up: None,
        })
    }
}

impl StubBackend {
    pub fn answering(response: ChatResponse) -> Self {
        Self {
            reply: Reply::Answer(response),
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            reply: Reply::Fail(error),
        }
    }

    /// Panics inside `send_message`, as a crashed request task would.
    pub fn panicking() -> Self {
        Self { reply: Reply::Panic }
    }
}

#[async_trait]
impl ChatBackend for StubBackend {
    fn base_url(&self) -> &str {
        STUB_BASE_URL
    }

    async fn send_message(&self, _request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        match &self.reply {
            Reply::Answer(response) => Ok(response.clone()),
            Reply::Fail(error) => Err(error.clone()),
            Reply::Panic => panic!("stub backend crashed"),
        }
    }

    async fn health_check(&self) -> Result<serde_json::Value, ApiError> {
        Ok(serde_json::json!({ "status": "healthy" }))
    }

    async fn index_stats(&self) -> Result<serde_json::Value, ApiError> {
        Ok(serde_json::json!({ "total_documents": 0 }))
    }
}

/// Fresh app with no profile, backed by the default stub.
pub fn test_app() -> App {
    App::new(Arc::new(StubBackend::default()), None)
}
