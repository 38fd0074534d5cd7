//! StatusStore - process-wide login state and result history.
//!
//! The store owns the current [`LoginState`], the last recorded result, a
//! bounded result history, and the listener registry whose scopes are the
//! [`LoginStatus`](crate::LoginStatus) holders. A transition updates the state
//! under the write lock, releases it, then emits `status-change` followed by
//! the transition's own event to every holder.

use std::collections::VecDeque;
use std::sync::{Arc, OnceLock, RwLock};

use herald_events::EventRegistry;
use herald_models::{LoginEvent, LoginFailure, LoginPayload, LoginResult, LoginState};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::StatusConfig;
use crate::error::{AuthError, Result};

/// Registry type shared by every holder of a store.
pub type LoginRegistry = EventRegistry<LoginEvent, LoginPayload>;

static GLOBAL_STORE: OnceLock<StatusStore> = OnceLock::new();

/// Internal state of the store.
#[derive(Debug, Default)]
pub(crate) struct StatusState {
    state: LoginState,
    last_result: Option<LoginResult>,
    history: VecDeque<LoginResult>,
}

impl StatusState {
    fn record(&mut self, result: LoginResult, limit: usize) {
        self.last_result = Some(result.clone());
        if limit == 0 {
            return;
        }
        while self.history.len() >= limit {
            self.history.pop_front();
        }
        self.history.push_back(result);
    }

    /// Payload a late subscriber to `event` receives, if the state already
    /// satisfies it.
    pub(crate) fn immediate_payload(&self, event: LoginEvent) -> Option<LoginPayload> {
        match (event, self.state) {
            (LoginEvent::Logging, LoginState::InProgress) => Some(LoginPayload::Logging),
            (LoginEvent::Success, LoginState::Succeeded) => {
                let value = match &self.last_result {
                    Some(LoginResult::Success { payload, .. }) => payload.clone(),
                    _ => Value::Null,
                };
                Some(LoginPayload::Success(value))
            }
            _ => None,
        }
    }
}

/// Shared login state service.
///
/// Cloning is cheap; clones observe and drive the same state.
#[derive(Clone)]
pub struct StatusStore {
    state: Arc<RwLock<StatusState>>,
    registry: LoginRegistry,
    config: Arc<StatusConfig>,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new(StatusConfig::default())
    }
}

impl StatusStore {
    /// Creates an independent store.
    pub fn new(config: StatusConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(StatusState::default())),
            registry: LoginRegistry::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the process-wide store, created on first use from
    /// [`StatusConfig::from_env`].
    pub fn global() -> &'static StatusStore {
        GLOBAL_STORE.get_or_init(|| StatusStore::new(StatusConfig::from_env()))
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    /// Returns the listener registry.
    pub fn registry(&self) -> &LoginRegistry {
        &self.registry
    }

    /// Number of live holders with listener tables.
    pub fn holder_count(&self) -> usize {
        self.registry.scope_count()
    }

    /// Returns the current state.
    pub fn status(&self) -> LoginState {
        match self.state.read() {
            Ok(state) => state.state,
            Err(e) => {
                warn!("status read failed: {}", e);
                LoginState::default()
            }
        }
    }

    /// Returns the most recent result, if it has not been cleared.
    pub fn last_result(&self) -> Option<LoginResult> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.last_result.clone())
    }

    /// Returns the retained results, oldest first.
    pub fn results(&self) -> Vec<LoginResult> {
        self.state
            .read()
            .map(|state| state.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Forgets every retained result, including the last one.
    pub fn clear_results(&self) -> Result<()> {
        let mut state = self.write_state()?;
        state.history.clear();
        state.last_result = None;
        Ok(())
    }

    /// Moves to `InProgress` and emits `status-change` then `logging`.
    pub fn logging(&self) -> Result<()> {
        {
            let mut state = self.write_state()?;
            state.last_result = None;
            self.enter(&mut state, LoginState::InProgress);
        }
        self.publish(LoginState::InProgress, LoginPayload::Logging);
        Ok(())
    }

    /// Moves to `Succeeded`, records `payload`, and emits `status-change`
    /// then `success`.
    pub fn success(&self, payload: Value) -> Result<()> {
        {
            let mut state = self.write_state()?;
            state.record(LoginResult::success(payload.clone()), self.config.history_limit);
            self.enter(&mut state, LoginState::Succeeded);
        }
        self.publish(LoginState::Succeeded, LoginPayload::Success(payload));
        Ok(())
    }

    /// Moves to `Pending`, records `error`, and emits `status-change` then
    /// `fail`.
    pub fn fail(&self, error: LoginFailure) -> Result<()> {
        {
            let mut state = self.write_state()?;
            state.record(LoginResult::failure(error.clone()), self.config.history_limit);
            self.enter(&mut state, LoginState::Pending);
        }
        self.publish(LoginState::Pending, LoginPayload::Fail(error));
        Ok(())
    }

    pub(crate) fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, StatusState>> {
        self.state
            .read()
            .map_err(|e| AuthError::LockPoisoned(e.to_string()))
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, StatusState>> {
        self.state
            .write()
            .map_err(|e| AuthError::LockPoisoned(e.to_string()))
    }

    fn enter(&self, state: &mut StatusState, next: LoginState) {
        info!(from = %state.state, to = %next, "login state changed");
        state.state = next;
    }

    fn publish(&self, next: LoginState, payload: LoginPayload) {
        self.registry
            .emit_all(&LoginEvent::StatusChange, &LoginPayload::StatusChange(next));
        self.registry.emit_all(&payload.event(), &payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initial_state() {
        let store = StatusStore::default();
        assert_eq!(store.status(), LoginState::Pending);
        assert!(store.last_result().is_none());
        assert!(store.results().is_empty());
    }

    #[test]
    fn test_transitions() {
        let store = StatusStore::default();

        store.logging().unwrap();
        assert_eq!(store.status(), LoginState::InProgress);

        store.success(json!("token-123")).unwrap();
        assert_eq!(store.status(), LoginState::Succeeded);
        assert_eq!(
            store.last_result().map(|r| r.to_payload()),
            Some(LoginPayload::Success(json!("token-123")))
        );

        store.logging().unwrap();
        assert_eq!(store.status(), LoginState::InProgress);
        assert!(store.last_result().is_none());

        store.fail(LoginFailure::new("bad credentials")).unwrap();
        assert_eq!(store.status(), LoginState::Pending);
        assert_eq!(store.results().len(), 2);
    }

    #[test]
    fn test_success_to_pending_allowed() {
        let store = StatusStore::default();
        store.success(json!(1)).unwrap();
        store.fail(LoginFailure::new("revoked")).unwrap();
        assert_eq!(store.status(), LoginState::Pending);
    }

    #[test]
    fn test_history_limit() {
        let store = StatusStore::new(StatusConfig::new().with_history_limit(2));

        store.success(json!(1)).unwrap();
        store.success(json!(2)).unwrap();
        store.success(json!(3)).unwrap();

        let payloads: Vec<LoginPayload> = store.results().iter().map(|r| r.to_payload()).collect();
        assert_eq!(
            payloads,
            vec![LoginPayload::Success(json!(2)), LoginPayload::Success(json!(3))]
        );
    }

    #[test]
    fn test_zero_history_keeps_last_result() {
        let store = StatusStore::new(StatusConfig::new().with_history_limit(0));
        store.success(json!("t")).unwrap();

        assert!(store.results().is_empty());
        assert!(store.last_result().is_some());
    }

    #[test]
    fn test_clear_results() {
        let store = StatusStore::default();
        store.success(json!("t")).unwrap();
        store.clear_results().unwrap();

        assert!(store.results().is_empty());
        assert!(store.last_result().is_none());
        assert_eq!(store.status(), LoginState::Succeeded);
    }

    #[test]
    fn test_immediate_payload() {
        let mut state = StatusState::default();
        assert_eq!(state.immediate_payload(LoginEvent::Logging), None);

        state.state = LoginState::InProgress;
        assert_eq!(
            state.immediate_payload(LoginEvent::Logging),
            Some(LoginPayload::Logging)
        );
        assert_eq!(state.immediate_payload(LoginEvent::Success), None);

        state.state = LoginState::Succeeded;
        assert_eq!(
            state.immediate_payload(LoginEvent::Success),
            Some(LoginPayload::Success(Value::Null))
        );

        state.record(LoginResult::success(json!("token-123")), 4);
        assert_eq!(
            state.immediate_payload(LoginEvent::Success),
            Some(LoginPayload::Success(json!("token-123")))
        );
        assert_eq!(state.immediate_payload(LoginEvent::Fail), None);
        assert_eq!(state.immediate_payload(LoginEvent::StatusChange), None);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(StatusStore::global(), StatusStore::global()));
    }
}
