//! Error types for event registry operations.

use thiserror::Error;

/// Errors that can occur during event registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Registration input rejected (empty group, reserved group, empty name).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type alias for event registry operations.
pub type Result<T> = std::result::Result<T, EventError>;
