//! LoginStatus - per-instance subscriber set over a shared status store.

use herald_events::{dispatch, resolve_group, Callback, Scope, Target};
use herald_models::{LoginEvent, LoginFailure, LoginPayload, LoginResult, LoginState};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::store::StatusStore;

/// Login status holder.
///
/// State and results live in the [`StatusStore`] and are shared by every
/// holder of that store. Listeners belong to the holder: removing them on one
/// holder never affects another. A transition triggered through any holder
/// notifies the listeners of all of them.
///
/// Clones share the same listener table. The table is dropped by
/// [`destroy`](Self::destroy), or lazily once every clone is gone.
///
/// # Example
///
/// ```
/// use herald_auth::{LoginStatus, StatusStore};
/// use herald_events::Callback;
/// use herald_models::{LoginPayload, LoginState};
///
/// let store = StatusStore::default();
/// let status = LoginStatus::with_store(&store);
///
/// status
///     .on_success(Callback::new(|payload: &LoginPayload| {
///         println!("logged in: {:?}", payload.as_success());
///     }))
///     .unwrap();
///
/// status.logging().unwrap();
/// status.success("token-123").unwrap();
/// assert_eq!(status.status(), LoginState::Succeeded);
/// ```
#[derive(Clone)]
pub struct LoginStatus {
    store: StatusStore,
    scope: Scope<LoginEvent, LoginPayload>,
}

impl Default for LoginStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginStatus {
    /// Creates a holder over the process-wide store.
    pub fn new() -> Self {
        Self::with_store(StatusStore::global())
    }

    /// Creates a holder over `store`.
    pub fn with_store(store: &StatusStore) -> Self {
        Self {
            store: store.clone(),
            scope: store.registry().scope(),
        }
    }

    /// Returns the store this holder reads from.
    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Returns the current state.
    pub fn status(&self) -> LoginState {
        self.store.status()
    }

    /// Returns the most recent result, if it has not been cleared.
    pub fn last_result(&self) -> Option<LoginResult> {
        self.store.last_result()
    }

    /// Returns the retained results, oldest first.
    pub fn results(&self) -> Vec<LoginResult> {
        self.store.results()
    }

    /// Forgets every retained result.
    pub fn clear_results(&self) -> Result<()> {
        self.store.clear_results()
    }

    /// Starts an authentication attempt.
    pub fn logging(&self) -> Result<()> {
        self.store.logging()
    }

    /// Completes the attempt successfully with `payload`.
    pub fn success(&self, payload: impl Into<Value>) -> Result<()> {
        self.store.success(payload.into())
    }

    /// Completes the attempt with `error`.
    pub fn fail(&self, error: LoginFailure) -> Result<()> {
        self.store.fail(error)
    }

    /// Registers a persistent listener for `event`.
    ///
    /// Subscribing to `logging` while `InProgress`, or to `success` while
    /// `Succeeded`, invokes `callback` right away with the last recorded
    /// result instead of registering it.
    pub fn on(
        &self,
        event: LoginEvent,
        callback: Callback<LoginPayload>,
        group: Option<&str>,
    ) -> Result<()> {
        self.subscribe(event, callback, group, false)
    }

    /// Registers a one-shot listener for `event`, with the same immediate
    /// delivery rule as [`on`](Self::on).
    pub fn once(
        &self,
        event: LoginEvent,
        callback: Callback<LoginPayload>,
        group: Option<&str>,
    ) -> Result<()> {
        self.subscribe(event, callback, group, true)
    }

    /// Listens for `logging`.
    pub fn on_logging(&self, callback: Callback<LoginPayload>) -> Result<()> {
        self.on(LoginEvent::Logging, callback, None)
    }

    /// Listens for `success`.
    pub fn on_success(&self, callback: Callback<LoginPayload>) -> Result<()> {
        self.on(LoginEvent::Success, callback, None)
    }

    /// Listens for `fail`. Never satisfied immediately.
    pub fn on_fail(&self, callback: Callback<LoginPayload>) -> Result<()> {
        self.on(LoginEvent::Fail, callback, None)
    }

    /// Listens for every state transition.
    pub fn on_status_change(&self, callback: Callback<LoginPayload>) -> Result<()> {
        self.on(LoginEvent::StatusChange, callback, None)
    }

    /// Removes this holder's listeners of `event` selected by `target`.
    pub fn off(
        &self,
        event: LoginEvent,
        target: impl Into<Target<LoginPayload>>,
    ) -> Result<usize> {
        Ok(self.scope.off(&event, target)?)
    }

    /// Removes all of this holder's listeners, for every event.
    pub fn clear(&self) -> Result<usize> {
        Ok(self.scope.clear()?)
    }

    /// Number of this holder's listeners for `event`.
    pub fn listener_count(&self, event: LoginEvent) -> usize {
        self.scope.listener_count(&event)
    }

    /// Drops this holder's listener table.
    pub fn destroy(self) {
        self.scope.dispose()
    }

    fn subscribe(
        &self,
        event: LoginEvent,
        callback: Callback<LoginPayload>,
        group: Option<&str>,
        once: bool,
    ) -> Result<()> {
        let resolved = resolve_group(Some(
            group.unwrap_or(self.store.config().default_group.as_str()),
        ))?;
        let group = Some(resolved.as_str());

        // Holding the read guard keeps a transition from slipping in between
        // the state check and the registration.
        let state = self.store.read_state()?;
        let Some(payload) = state.immediate_payload(event) else {
            if once {
                self.scope.once(event, callback, group)?;
            } else {
                self.scope.on(event, callback, group)?;
            }
            return Ok(());
        };
        drop(state);

        debug!(scope = self.scope.id(), event = %event, "delivering to late subscriber");
        dispatch(&event, std::slice::from_ref(&callback), &payload);
        Ok(())
    }
}
