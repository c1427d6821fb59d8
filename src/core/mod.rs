//! # Core Application Logic
//!
//! The assistant's business logic. It knows nothing about any specific UI
//! technology and performs no I/O of its own: requests leave the core as
//! `Effect::SpawnRequest` and come back as `Action`s.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │                         │
//!                    │  • State (transcript)   │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • config resolution    │
//!                    └───────────┬─────────────┘
//!                                │
//!               ┌────────────────┴────────────────┐
//!               ▼                                 ▼
//!        ┌────────────┐                    ┌────────────┐
//!        │    TUI     │                    │    API     │
//!        │  Adapter   │                    │  (reqwest) │
//!        │ (ratatui)  │                    │            │
//!        └────────────┘                    └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update` reducer
//! - [`message`]: Transcript entries and relative timestamps
//! - [`config`]: Config file, env and CLI resolution

pub mod action;
pub mod config;
pub mod message;
pub mod state;
