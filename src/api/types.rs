//! Wire types for the campus assistant backend.
//!
//! These mirror the JSON bodies of `POST /api/chat` exactly. Optional request
//! fields are omitted (not sent as `null`) when unset, and the list fields of
//! the response default to empty so a sparse body still decodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Citation metadata attached to an assistant answer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    pub title: String,
    pub snippet: String,
    pub category: String,
}

/// A canned follow-up; `prompt` becomes the next outgoing message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: String,
    pub label: String,
    pub prompt: String,
}

/// Optional student profile the backend may use to personalize answers.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
}

impl UserProfile {
    /// True when neither field is set.
    pub fn is_empty(&self) -> bool {
        self.program.is_none() && self.year.is_none()
    }
}

/// Body of `POST /api/chat`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
}

/// Decoded body of a successful `POST /api/chat`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub follow_up: Option<String>,
}

/// FastAPI error envelope: `{"detail": ...}`.
///
/// `HTTPException` puts a string here; request validation failures (422)
/// put a list of `{loc, msg, type}` objects.
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Parse an error body, returning the human-readable detail if there is one.
    pub fn detail_from(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::String(_) | serde_json::Value::Null => None,
            serde_json::Value::Array(entries) => {
                let msgs: Vec<&str> = entries
                    .iter()
                    .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if msgs.is_empty() {
                    Some(serde_json::Value::Array(entries.clone()).to_string())
                } else {
                    Some(msgs.join("; "))
                }
            }
            other => Some(other.to_string()),
        }
    }
}

/// Session id for one outgoing message: `session_<unix millis>`.
///
/// A fresh id is derived for every send, so the backend sees each message as
/// its own session.
pub fn session_id_at(now: DateTime<Utc>) -> String {
    format!("session_{}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn request_omits_unset_optionals() {
        let req = ChatRequest {
            message: "Hi".to_string(),
            session_id: None,
            user_profile: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Hi" }));
    }

    #[test]
    fn request_includes_partial_profile() {
        let req = ChatRequest {
            message: "Hi".to_string(),
            session_id: Some("session_1".to_string()),
            user_profile: Some(UserProfile {
                program: Some("MSIT".to_string()),
                year: None,
            }),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Hi",
                "session_id": "session_1",
                "user_profile": { "program": "MSIT" }
            })
        );
    }

    #[test]
    fn response_defaults_missing_lists() {
        let resp: ChatResponse = serde_json::from_str(r#"{"answer":"ok"}"#).unwrap();
        assert_eq!(resp.answer, "ok");
        assert!(resp.sources.is_empty());
        assert!(resp.suggestions.is_empty());
        assert_eq!(resp.follow_up, None);
    }

    #[test]
    fn response_decodes_full_body() {
        let body = r#"{
            "answer": "Shuttles run every 30 minutes.",
            "sources": [{"id":"1","title":"Transport Guide","snippet":"...","category":"transport"}],
            "suggestions": [{"id":"s1","label":"Show route map","prompt":"Show me the shuttle route map"}],
            "follow_up": "Want the weekend schedule?"
        }"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.sources[0].title, "Transport Guide");
        assert_eq!(resp.suggestions[0].prompt, "Show me the shuttle route map");
        assert_eq!(resp.follow_up.as_deref(), Some("Want the weekend schedule?"));
    }

    #[test]
    fn detail_string_is_used_verbatim() {
        let detail = ErrorBody::detail_from(r#"{"detail":"Message cannot be empty"}"#);
        assert_eq!(detail.as_deref(), Some("Message cannot be empty"));
    }

    #[test]
    fn detail_validation_list_joins_messages() {
        let body = r#"{"detail":[
            {"loc":["body","message"],"msg":"field required","type":"value_error.missing"},
            {"loc":["body","year"],"msg":"value is not a valid integer","type":"type_error.integer"}
        ]}"#;
        assert_eq!(
            ErrorBody::detail_from(body).as_deref(),
            Some("field required; value is not a valid integer")
        );
    }

    #[test]
    fn detail_absent_or_unparseable_is_none() {
        assert_eq!(ErrorBody::detail_from("Internal Server Error"), None);
        assert_eq!(ErrorBody::detail_from(r#"{"error":"x"}"#), None);
        assert_eq!(ErrorBody::detail_from(r#"{"detail":"   "}"#), None);
        assert_eq!(ErrorBody::detail_from(r#"{"detail":null}"#), None);
    }

    #[test]
    fn session_id_is_millis_derived() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(session_id_at(now), "session_1700000000123");
    }

    #[test]
    fn empty_profile_detection() {
        assert!(UserProfile::default().is_empty());
        let profile = UserProfile {
            program: None,
            year: Some(2),
        };
        assert!(!profile.is_empty());
    }
}
