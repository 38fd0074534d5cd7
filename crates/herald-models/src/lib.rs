//! Core data models for Herald.
//!
//! This crate provides the types shared by the event registry and the login
//! status holder: the login state machine states, the closed set of login
//! events, and the typed payloads delivered to listeners.

pub mod event;
pub mod payload;
pub mod state;

// Re-export main types
pub use event::LoginEvent;
pub use payload::{LoginFailure, LoginPayload, LoginResult};
pub use state::LoginState;
