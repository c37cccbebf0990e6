//! Navigation listeners.
//!
//! Listeners are how the history/URL source learns that a path became
//! active. They run **after** a navigation commits and cannot influence it;
//! use a [guard](crate::guards) for that.
//!
//! Listeners run in registration order. A navigation that is aborted,
//! superseded or fails to load produces no listener call.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use view_navigator::listener_fn;
//!
//! let history = Arc::new(Mutex::new(Vec::new()));
//! let sink = history.clone();
//! let listener = listener_fn(move |event| {
//!     sink.lock().unwrap().push(event.to.clone());
//! });
//! # let _ = listener;
//! ```

/// Emitted once per committed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChangeEvent {
    /// Path that was active before (None on the first commit)
    pub from: Option<String>,
    /// Path now active, with query and fragment passed through
    pub to: String,
    /// Name of the route now active
    pub route_name: String,
    /// Sequence number of the committing navigation
    pub sequence: u64,
}

/// Receives navigation notifications.
///
/// Notifications are delivered one at a time, in commit order. A listener
/// may read router state but must not block on a new navigation of the same
/// router from inside a callback.
pub trait NavigationListener: Send + Sync + 'static {
    /// Called after a navigation commits.
    fn on_committed(&self, event: &RouteChangeEvent);

    /// Called when a path matched no route.
    fn on_not_found(&self, _path: &str) {}

    /// Listener name for debugging.
    fn name(&self) -> &'static str {
        "NavigationListener"
    }
}

/// Create a listener from a commit callback.
pub const fn listener_fn<F>(f: F) -> FnListener<F>
where
    F: Fn(&RouteChangeEvent) + Send + Sync + 'static,
{
    FnListener { f }
}

/// Listener created by [`listener_fn`].
pub struct FnListener<F> {
    f: F,
}

impl<F> NavigationListener for FnListener<F>
where
    F: Fn(&RouteChangeEvent) + Send + Sync + 'static,
{
    fn on_committed(&self, event: &RouteChangeEvent) {
        (self.f)(event);
    }
}
