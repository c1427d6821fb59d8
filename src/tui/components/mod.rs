//! # TUI Components
//!
//! All widgets of the chat screen.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Built each frame from plain data copied out of `App`:
//! - `Header`: title banner with connection status
//! - `WelcomeScreen`: greeting and quick questions for an empty transcript
//! - `ChatBubble`: one message, with its sources toggle
//! - `SuggestionPills`: follow-up prompts from the latest answer
//! - `ErrorBanner`: last request error
//!
//! ### Stateful Components (Event-Driven)
//!
//! Own local state that survives between frames and emit events:
//! - `InputBox`: multi-line text field
//! - `MessageList`: scrollable transcript with layout caching
//!
//! Components never touch `App` directly; dependencies arrive as props so
//! each one can be rendered against a `TestBackend` in isolation.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── header.rs           (Title banner)
//! ├── welcome.rs          (Empty-transcript screen)
//! ├── chat_bubble.rs      (Single message renderer)
//! ├── message_list.rs     (Scrollable transcript)
//! ├── suggestion_pills.rs (Follow-up prompts)
//! ├── error_banner.rs     (Request error)
//! └── input_box/          (Text input)
//! ```

pub mod chat_bubble;
pub mod error_banner;
pub mod header;
pub mod input_box;
pub mod message_list;
pub mod suggestion_pills;
pub mod welcome;

pub use error_banner::ErrorBanner;
pub use header::Header;
pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use suggestion_pills::SuggestionPills;
pub use welcome::{QUICK_QUESTIONS, WelcomeScreen};
