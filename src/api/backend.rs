use std::fmt;

use async_trait::async_trait;

use super::types::{ChatRequest, ChatResponse};

/// Errors that can occur while talking to the backend.
///
/// The chat flow treats every variant the same way (banner + apology); the
/// distinction is kept for logs and the diagnostics commands.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Client misconfigured (unusable base URL, TLS setup).
    Config(String),
    /// Network-level failure (DNS, connection refused, timeout).
    Network(String),
    /// Backend answered with a non-success status.
    Api {
        status: u16,
        /// Server-supplied `detail`, if the body carried one.
        detail: Option<String>,
        body: String,
    },
    /// A success status with a body that is not the expected JSON.
    Parse(String),
    /// The request task ended before it produced a result.
    Interrupted,
}

impl ApiError {
    /// Server-provided detail message, when the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "client config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api {
                status,
                detail: Some(detail),
                ..
            } => write!(f, "backend error (HTTP {status}): {detail}"),
            ApiError::Api { status, body, .. } => {
                write!(f, "backend error (HTTP {status}): {body}")
            }
            ApiError::Parse(msg) => write!(f, "unexpected response body: {msg}"),
            ApiError::Interrupted => write!(f, "request ended before the backend replied"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The question-answering service the chat talks to.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Base URL requests are issued against (no trailing slash).
    fn base_url(&self) -> &str;

    /// `POST /api/chat`: one blocking question/answer exchange.
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;

    /// `GET /api/health`: backend-defined JSON, for manual diagnostics.
    async fn health_check(&self) -> Result<serde_json::Value, ApiError>;

    /// `GET /api/index/stats`: backend-defined JSON, for manual diagnostics.
    async fn index_stats(&self) -> Result<serde_json::Value, ApiError>;
}
