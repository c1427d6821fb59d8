//! reqwest-backed [`ChatBackend`].
//!
//! One `reqwest::Client` per process, one request per call. No retries and
//! no timeout unless the caller configures one.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::backend::{ApiError, ChatBackend};
use super::types::{ChatRequest, ChatResponse, ErrorBody};

pub const CHAT_PATH: &str = "/api/chat";
pub const HEALTH_PATH: &str = "/api/health";
pub const INDEX_STATS_PATH: &str = "/api/index/stats";

/// HTTP client for the campus assistant JSON API.
#[derive(Debug)]
pub struct HttpClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client for `base_url`. A trailing `/` is ignored.
    ///
    /// `timeout` bounds each whole request when set.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&base_url.into());
        reqwest::Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a response into `T`, or the matching `ApiError`.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            let detail = ErrorBody::detail_from(&body);
            warn!("Backend returned HTTP {}: {}", status.as_u16(), body);
            return Err(ApiError::Api {
                status: status.as_u16(),
                detail,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(response).await
    }
}

#[async_trait]
impl ChatBackend for HttpClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let url = self.url(CHAT_PATH);
        info!(
            "POST {} (message_len={}, session_id={:?}, profile={})",
            url,
            request.message.len(),
            request.session_id,
            request.user_profile.is_some()
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!("Chat response status: {}", response.status());
        let chat: ChatResponse = Self::decode(response).await?;
        info!(
            "Chat answer received: {} bytes, {} sources, {} suggestions",
            chat.answer.len(),
            chat.sources.len(),
            chat.suggestions.len()
        );
        Ok(chat)
    }

    async fn health_check(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json(HEALTH_PATH).await
    }

    async fn index_stats(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json(INDEX_STATS_PATH).await
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
