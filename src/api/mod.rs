pub mod backend;
pub mod client;
pub mod types;

pub use backend::{ApiError, ChatBackend};
pub use client::HttpClient;
pub use types::{ChatRequest, ChatResponse, Source, Suggestion, UserProfile};
