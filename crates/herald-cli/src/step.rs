//! Simulation steps parsed from the command line.

use std::str::FromStr;

use herald_models::LoginEvent;
use serde_json::Value;
use thiserror::Error;

/// Error returned for an unparsable step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid step '{input}': {reason}")]
pub struct StepError {
    /// The raw step text.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

impl StepError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// One action of a scripted login flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Start an attempt.
    Logging,
    /// Succeed with a payload.
    Success(Value),
    /// Fail with a message.
    Fail(String),
    /// Register a late subscriber for an event.
    Subscribe(LoginEvent),
}

/// Failure message used when `fail` has none.
pub const DEFAULT_FAILURE: &str = "login failed";

impl FromStr for Step {
    type Err = StepError;

    /// Accepts `logging`, `success[:payload]`, `fail[:message]` and
    /// `subscribe:<event>`. A success payload is read as JSON when it parses,
    /// otherwise as a plain string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        match (name, arg) {
            ("logging", None) => Ok(Step::Logging),
            ("logging", Some(_)) => Err(StepError::new(s, "logging takes no argument")),
            ("success", None) => Ok(Step::Success(Value::Null)),
            ("success", Some(raw)) => Ok(Step::Success(
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
            )),
            ("fail", None) => Ok(Step::Fail(DEFAULT_FAILURE.to_string())),
            ("fail", Some(message)) => Ok(Step::Fail(message.to_string())),
            ("subscribe", Some(event)) => event
                .parse::<LoginEvent>()
                .map(Step::Subscribe)
                .map_err(|reason| StepError::new(s, reason)),
            ("subscribe", None) => Err(StepError::new(s, "subscribe needs an event name")),
            _ => Err(StepError::new(s, "unknown step")),
        }
    }
}
