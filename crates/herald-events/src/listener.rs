//! Listener records, callback handles and removal targets.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{error, trace};

use crate::error::{EventError, Result};

/// Group assigned to listeners registered without one.
pub const DEFAULT_GROUP: &str = "default";

/// Reserved target that clears an event regardless of group.
pub const WILDCARD: &str = "*";

/// Closure type for event listeners.
pub type ListenerFn<P> = dyn Fn(&P) + Send + Sync;

/// Shared handle to a listener closure.
///
/// Equality is reference identity: clones of one handle are equal, two
/// handles built from separate `new` calls never are, even when they wrap
/// the same function.
pub struct Callback<P> {
    inner: Arc<ListenerFn<P>>,
}

impl<P> Callback<P> {
    /// Wraps `f` in a new handle.
    pub fn new(f: impl Fn(&P) + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// Invokes the wrapped closure.
    pub fn call(&self, payload: &P) {
        (self.inner)(payload)
    }

    /// Returns true if both handles point at the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.inner) as *const () == Arc::as_ptr(&other.inner) as *const ()
    }
}

impl<P> Clone for Callback<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> PartialEq for Callback<P> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<P> Eq for Callback<P> {}

impl<P> fmt::Debug for Callback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback")
            .field(&(Arc::as_ptr(&self.inner) as *const ()))
            .finish()
    }
}

/// A registered listener.
#[derive(Debug)]
pub struct Listener<P> {
    /// Registration id, unique within its table.
    pub id: u64,
    /// Group tag used for bulk removal.
    pub group: String,
    /// The callback to invoke.
    pub callback: Callback<P>,
    /// Removed after its first dispatch.
    pub once: bool,
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            group: self.group.clone(),
            callback: self.callback.clone(),
            once: self.once,
        }
    }
}

/// What `off` removes.
#[derive(Debug)]
pub enum Target<P> {
    /// Every listener of the named event.
    Any,
    /// Every listener of the named event, whatever its group. What `"*"`
    /// converts to.
    Wildcard,
    /// Listeners of the named event registered under this group.
    Group(String),
    /// Every registration of this exact callback for the named event.
    Callback(Callback<P>),
}

impl<P> Target<P> {
    /// Returns true if this listener is selected for removal.
    pub fn matches(&self, listener: &Listener<P>) -> bool {
        match self {
            Target::Any | Target::Wildcard => true,
            Target::Group(group) => listener.group == *group,
            Target::Callback(callback) => listener.callback.ptr_eq(callback),
        }
    }
}

impl<P> Clone for Target<P> {
    fn clone(&self) -> Self {
        match self {
            Target::Any => Target::Any,
            Target::Wildcard => Target::Wildcard,
            Target::Group(group) => Target::Group(group.clone()),
            Target::Callback(callback) => Target::Callback(callback.clone()),
        }
    }
}

impl<P> From<&str> for Target<P> {
    fn from(value: &str) -> Self {
        if value == WILDCARD {
            Target::Wildcard
        } else {
            Target::Group(value.to_string())
        }
    }
}

impl<P> From<String> for Target<P> {
    fn from(value: String) -> Self {
        Target::from(value.as_str())
    }
}

impl<P> From<Callback<P>> for Target<P> {
    fn from(value: Callback<P>) -> Self {
        Target::Callback(value)
    }
}

impl<P> From<&Callback<P>> for Target<P> {
    fn from(value: &Callback<P>) -> Self {
        Target::Callback(value.clone())
    }
}

/// Resolves an optional group to the one stored on the record.
///
/// Empty groups and the wildcard are rejected.
pub fn resolve_group(group: Option<&str>) -> Result<String> {
    match group {
        None => Ok(DEFAULT_GROUP.to_string()),
        Some("") => Err(EventError::InvalidArgument(
            "group name must not be empty".to_string(),
        )),
        Some(WILDCARD) => Err(EventError::InvalidArgument(format!(
            "group name '{}' is reserved",
            WILDCARD
        ))),
        Some(group) => Ok(group.to_string()),
    }
}

/// Invokes each callback in order, isolating panics.
///
/// Returns the number of callbacks invoked.
pub fn dispatch<P>(event: &dyn fmt::Debug, callbacks: &[Callback<P>], payload: &P) -> usize {
    for (index, callback) in callbacks.iter().enumerate() {
        trace!(event = ?event, listener = index, "dispatching");
        if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(|| callback.call(payload))) {
            error!(
                event = ?event,
                listener = index,
                "listener panicked: {}",
                panic_message(cause.as_ref())
            );
        }
    }
    callbacks.len()
}

fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(message) = cause.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
