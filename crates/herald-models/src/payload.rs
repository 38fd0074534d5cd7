//! Typed payloads delivered to login listeners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::event::LoginEvent;
use crate::state::LoginState;

/// Error value reported by a failed login attempt.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct LoginFailure {
    /// Human readable reason.
    pub message: String,
    /// Optional structured detail from the authentication backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl LoginFailure {
    /// Creates a failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    /// Attaches structured detail.
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Payload passed to a listener, one variant per [`LoginEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum LoginPayload {
    /// Authentication started.
    Logging,
    /// Authentication succeeded with the given payload.
    Success(Value),
    /// Authentication failed with the given error.
    Fail(LoginFailure),
    /// The state changed to the given value.
    StatusChange(LoginState),
}

impl LoginPayload {
    /// Returns the event this payload belongs to.
    pub fn event(&self) -> LoginEvent {
        match self {
            LoginPayload::Logging => LoginEvent::Logging,
            LoginPayload::Success(_) => LoginEvent::Success,
            LoginPayload::Fail(_) => LoginEvent::Fail,
            LoginPayload::StatusChange(_) => LoginEvent::StatusChange,
        }
    }

    /// Returns the success value, if any.
    pub fn as_success(&self) -> Option<&Value> {
        match self {
            LoginPayload::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure, if any.
    pub fn as_failure(&self) -> Option<&LoginFailure> {
        match self {
            LoginPayload::Fail(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A recorded outcome of a login attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoginResult {
    /// The attempt succeeded.
    Success {
        /// Value passed to `success`.
        payload: Value,
        /// When the outcome was recorded.
        recorded_at: DateTime<Utc>,
    },
    /// The attempt failed.
    Failure {
        /// Error passed to `fail`.
        error: LoginFailure,
        /// When the outcome was recorded.
        recorded_at: DateTime<Utc>,
    },
}

impl LoginResult {
    /// Records a success now.
    pub fn success(payload: Value) -> Self {
        LoginResult::Success {
            payload,
            recorded_at: Utc::now(),
        }
    }

    /// Records a failure now.
    pub fn failure(error: LoginFailure) -> Self {
        LoginResult::Failure {
            error,
            recorded_at: Utc::now(),
        }
    }

    /// Returns true for a successful outcome.
    pub fn is_success(&self) -> bool {
        matches!(self, LoginResult::Success { .. })
    }

    /// Returns when the outcome was recorded.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        match self {
            LoginResult::Success { recorded_at, .. } => *recorded_at,
            LoginResult::Failure { recorded_at, .. } => *recorded_at,
        }
    }

    /// Converts the outcome into the payload a listener would have seen.
    pub fn to_payload(&self) -> LoginPayload {
        match self {
            LoginResult::Success { payload, .. } => LoginPayload::Success(payload.clone()),
            LoginResult::Failure { error, .. } => LoginPayload::Fail(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_display() {
        let failure = LoginFailure::new("bad credentials");
        assert_eq!(failure.to_string(), "bad credentials");
        assert!(failure.detail.is_none());

        let failure = failure.with_detail(json!({"code": 401}));
        assert_eq!(failure.detail, Some(json!({"code": 401})));
    }

    #[test]
    fn test_payload_event() {
        assert_eq!(LoginPayload::Logging.event(), LoginEvent::Logging);
        assert_eq!(
            LoginPayload::Success(json!("token-123")).event(),
            LoginEvent::Success
        );
        assert_eq!(
            LoginPayload::Fail(LoginFailure::new("x")).event(),
            LoginEvent::Fail
        );
        assert_eq!(
            LoginPayload::StatusChange(LoginState::Pending).event(),
            LoginEvent::StatusChange
        );
    }

    #[test]
    fn test_payload_accessors() {
        let payload = LoginPayload::Success(json!("token-123"));
        assert_eq!(payload.as_success(), Some(&json!("token-123")));
        assert!(payload.as_failure().is_none());
    }

    #[test]
    fn test_payload_serialization() {
        let payload = LoginPayload::StatusChange(LoginState::Succeeded);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, json!({"event": "status-change", "data": "succeeded"}));
    }

    #[test]
    fn test_result_to_payload() {
        let result = LoginResult::success(json!("token-123"));
        assert!(result.is_success());
        assert_eq!(result.to_payload(), LoginPayload::Success(json!("token-123")));

        let result = LoginResult::failure(LoginFailure::new("denied"));
        assert!(!result.is_success());
        assert_eq!(
            result.to_payload(),
            LoginPayload::Fail(LoginFailure::new("denied"))
        );
    }
}
