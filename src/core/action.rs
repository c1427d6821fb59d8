//! # Actions
//!
//! Everything that can happen in the assistant becomes an `Action`.
//! User presses Enter or clicks a pill? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::ResponseReceived(response)`.
//!
//! `update()` applies an action to the state and returns an `Effect`
//! describing the I/O the adapter should perform. No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! A turn is two states: idle and awaiting-response (`App::is_loading`).
//! `Submit` moves idle → awaiting; exactly one of `ResponseReceived` or
//! `RequestFailed` moves it back.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::api::types::session_id_at;
use crate::api::{ApiError, ChatRequest, ChatResponse};
use crate::core::message::Message;
use crate::core::state::{App, STATUS_READY, STATUS_THINKING};

/// Banner text when the backend gave no detail of its own.
pub const FALLBACK_ERROR: &str = "Failed to get response. Please check if the backend is running.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Text typed and sent, or the prompt of a clicked suggestion.
    Submit(String),
    ResponseReceived(ChatResponse),
    RequestFailed(ApiError),
    Quit,
}

impl From<Result<ChatResponse, ApiError>> for Action {
    fn from(result: Result<ChatResponse, ApiError>) -> Self {
        match result {
            Ok(response) => Action::ResponseReceived(response),
            Err(e) => Action::RequestFailed(e),
        }
    }
}

/// I/O the adapter must perform after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Send this request to the backend and feed the outcome back as an `Action`.
    SpawnRequest(ChatRequest),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    update_at(app, action, Utc::now())
}

/// `update` with an explicit clock, for deterministic ids and timestamps.
pub fn update_at(app: &mut App, action: Action, now: DateTime<Utc>) -> Effect {
    match action {
        Action::Submit(text) => {
            let text = text.trim();
            if text.is_empty() {
                debug!("Ignoring empty submit");
                return Effect::None;
            }
            if app.is_loading {
                debug!("Ignoring submit while awaiting a response");
                return Effect::None;
            }

            let id = app.next_id(now);
            app.push_message(Message::user(id, text.to_string(), now));
            app.error = None;
            app.is_loading = true;
            app.status_message = String::from(STATUS_THINKING);

            let request = ChatRequest {
                message: text.to_string(),
                session_id: Some(session_id_at(now)),
                user_profile: app.profile.clone(),
            };
            info!(
                "Submitting message #{} ({} chars)",
                app.messages().len(),
                request.message.len()
            );
            Effect::SpawnRequest(request)
        }

        Action::ResponseReceived(response) => {
            if !app.is_loading {
                warn!("Response arrived with no request in flight, dropping it");
                return Effect::None;
            }
            let id = app.next_id(now);
            let message = Message::assistant(id, &response, now);
            app.current_suggestions = response.suggestions;
            app.push_message(message);
            release(app);
            Effect::None
        }

        Action::RequestFailed(err) => {
            if !app.is_loading {
                warn!("Failure arrived with no request in flight: {}", err);
                return Effect::None;
            }
            warn!("Chat request failed: {}", err);
            app.error = Some(
                err.detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| FALLBACK_ERROR.to_string()),
            );
            let id = app.next_id(now);
            let apology = apology_text(&app.health_url());
            app.push_message(Message::apology(id, apology, now));
            release(app);
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

fn release(app: &mut App) {
    app.is_loading = false;
    app.status_message = String::from(STATUS_READY);
}

pub fn apology_text(health_url: &str) -> String {
    format!(
        "❌ Sorry, I encountered an error. Please make sure the backend server is running. \
         You can check the connection by visiting {health_url}"
    )
}
