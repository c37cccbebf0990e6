//! Navigation guards.
//!
//! Guards run **before** a navigation commits and decide whether it should
//! proceed, be redirected, or be aborted. A guard is a value that returns a
//! [`GuardResult`]; there is no continuation to call, so a guard cannot
//! forget to resume the navigation.
//!
//! Guards may suspend (for example while waiting on a confirmation dialog or
//! a session lookup). The router re-checks whether the navigation is still
//! current every time a guard resumes, so guards later in the chain never
//! run for a superseded navigation.
//!
//! # Creating guards
//!
//! | Approach | When to use |
//! |----------|-------------|
//! | Implement [`RouteGuard`] | Named guard with its own state |
//! | [`guard_fn`] | Synchronous closure |
//! | [`async_guard_fn`] | Closure returning a future |
//!
//! # Execution order
//!
//! Guards run strictly in registration order. The first result that is not
//! [`GuardResult::Proceed`] ends the chain; later guards are not invoked. A
//! guard that panics counts as [`GuardResult::Abort`] and never lets the
//! navigation through.
//!
//! The built-in [`LoggingGuard`] sits at position 0 of every router chain
//! unless the router is built with
//! [`without_logging_guard`](crate::RouterBuilder::without_logging_guard).
//!
//! # Example
//!
//! ```
//! use view_navigator::{guard_fn, GuardResult};
//!
//! let signed_in = false;
//! let auth = guard_fn(move |to, _from| {
//!     if to.name() == "dashboard" && !signed_in {
//!         GuardResult::redirect("/signin")
//!     } else {
//!         GuardResult::Proceed
//!     }
//! });
//! # let _ = auth;
//! ```

use crate::matching::MatchedRoute;
use crate::{debug_log, error_log, info_log, trace_log};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

// ============================================================================
// GuardResult
// ============================================================================

/// Decision returned by a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardResult {
    /// Let the navigation continue to the next guard.
    Proceed,
    /// Restart matching with a different path.
    Redirect(String),
    /// Stop the navigation, leaving the current route in place.
    Abort(String),
}

impl GuardResult {
    /// Create a redirect result.
    pub fn redirect(to: impl Into<String>) -> Self {
        Self::Redirect(to.into())
    }

    /// Create an abort result with a human-readable reason.
    pub fn abort(reason: impl Into<String>) -> Self {
        Self::Abort(reason.into())
    }

    /// Check if this result lets navigation continue.
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    /// Check if this result redirects.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    /// Check if this result aborts.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort(_))
    }

    /// Redirect target, if any.
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            Self::Redirect(to) => Some(to),
            _ => None,
        }
    }

    /// Abort reason, if any.
    pub fn abort_reason(&self) -> Option<&str> {
        match self {
            Self::Abort(reason) => Some(reason),
            _ => None,
        }
    }
}

// ============================================================================
// RouteGuard trait
// ============================================================================

/// Interceptor consulted before a navigation commits.
///
/// `to` is the route being entered; `from` is the route committed when the
/// navigation started, or `None` on the first navigation.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use view_navigator::{GuardResult, MatchedRoute, RouteGuard};
///
/// struct RequireParam(&'static str);
///
/// #[async_trait]
/// impl RouteGuard for RequireParam {
///     async fn check(&self, to: &MatchedRoute, _from: Option<&MatchedRoute>) -> GuardResult {
///         if to.params().contains(self.0) {
///             GuardResult::Proceed
///         } else {
///             GuardResult::abort(format!("missing '{}'", self.0))
///         }
///     }
///
///     fn name(&self) -> &'static str {
///         "RequireParam"
///     }
/// }
/// ```
#[async_trait]
pub trait RouteGuard: Send + Sync + 'static {
    /// Decide what happens to the navigation.
    async fn check(&self, to: &MatchedRoute, from: Option<&MatchedRoute>) -> GuardResult;

    /// Guard name for logs and abort reasons.
    fn name(&self) -> &'static str {
        "RouteGuard"
    }
}

// ============================================================================
// Closure guards
// ============================================================================

/// Create a guard from a synchronous closure.
pub const fn guard_fn<F>(f: F) -> FnGuard<F>
where
    F: Fn(&MatchedRoute, Option<&MatchedRoute>) -> GuardResult + Send + Sync + 'static,
{
    FnGuard { f }
}

/// Guard created by [`guard_fn`].
pub struct FnGuard<F> {
    f: F,
}

#[async_trait]
impl<F> RouteGuard for FnGuard<F>
where
    F: Fn(&MatchedRoute, Option<&MatchedRoute>) -> GuardResult + Send + Sync + 'static,
{
    async fn check(&self, to: &MatchedRoute, from: Option<&MatchedRoute>) -> GuardResult {
        (self.f)(to, from)
    }
}

/// Create a guard from a closure returning a future.
///
/// The closure receives owned copies of the routes so the future can hold
/// them across suspension points.
///
/// ```
/// use view_navigator::{async_guard_fn, GuardResult};
///
/// let confirm_leave = async_guard_fn(|_to, from| async move {
///     match from {
///         Some(from) if from.name() == "feedback" => GuardResult::abort("unsaved feedback"),
///         _ => GuardResult::Proceed,
///     }
/// });
/// # let _ = confirm_leave;
/// ```
pub const fn async_guard_fn<F, Fut>(f: F) -> AsyncFnGuard<F>
where
    F: Fn(MatchedRoute, Option<MatchedRoute>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GuardResult> + Send + 'static,
{
    AsyncFnGuard { f }
}

/// Guard created by [`async_guard_fn`].
pub struct AsyncFnGuard<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> RouteGuard for AsyncFnGuard<F>
where
    F: Fn(MatchedRoute, Option<MatchedRoute>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GuardResult> + Send + 'static,
{
    async fn check(&self, to: &MatchedRoute, from: Option<&MatchedRoute>) -> GuardResult {
        (self.f)(to.clone(), from.cloned()).await
    }
}

// ============================================================================
// LoggingGuard
// ============================================================================

/// Logs every navigation target and always proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingGuard;

#[async_trait]
impl RouteGuard for LoggingGuard {
    async fn check(&self, to: &MatchedRoute, _from: Option<&MatchedRoute>) -> GuardResult {
        info_log!("Navigating to: {}", to.path());
        GuardResult::Proceed
    }

    fn name(&self) -> &'static str {
        "LoggingGuard"
    }
}

// ============================================================================
// GuardChain
// ============================================================================

/// Ordered guards evaluated with short-circuit semantics.
#[derive(Clone, Default)]
pub struct GuardChain {
    guards: Vec<Arc<dyn RouteGuard>>,
}

impl GuardChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain starting with [`LoggingGuard`].
    pub fn with_logging() -> Self {
        let mut chain = Self::new();
        chain.push(LoggingGuard);
        chain
    }

    /// Append a guard.
    pub fn push<G: RouteGuard>(&mut self, guard: G) {
        self.guards.push(Arc::new(guard));
    }

    /// Append an already shared guard.
    pub fn push_shared(&mut self, guard: Arc<dyn RouteGuard>) {
        self.guards.push(guard);
    }

    /// Guard names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    /// Number of guards.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// `true` if there are no guards.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Run the chain for one navigation.
    ///
    /// Returns the first non-`Proceed` result, or `Proceed` if every guard
    /// proceeds. A panicking guard yields `Abort`.
    pub async fn run(&self, to: &MatchedRoute, from: Option<&MatchedRoute>) -> GuardResult {
        self.run_while(to, from, || true)
            .await
            .unwrap_or(GuardResult::Proceed)
    }

    /// Run the chain while `is_current` holds.
    ///
    /// `is_current` is evaluated each time a guard resumes. Once it returns
    /// `false` the remaining guards are skipped, the resumed guard's result
    /// is dropped and `None` is returned.
    pub async fn run_while<F>(
        &self,
        to: &MatchedRoute,
        from: Option<&MatchedRoute>,
        is_current: F,
    ) -> Option<GuardResult>
    where
        F: Fn() -> bool,
    {
        for guard in &self.guards {
            let checked = AssertUnwindSafe(guard.check(to, from))
                .catch_unwind()
                .await;
            if !is_current() {
                debug_log!(
                    "Guard '{}' resumed for superseded navigation to '{}'",
                    guard.name(),
                    to.path()
                );
                return None;
            }

            let result = match checked {
                Ok(result) => result,
                Err(panic) => {
                    let reason = format!(
                        "guard '{}' faulted: {}",
                        guard.name(),
                        panic_message(panic.as_ref())
                    );
                    error_log!("Navigation to '{}' aborted: {}", to.path(), reason);
                    return Some(GuardResult::Abort(reason));
                }
            };

            trace_log!("Guard '{}' → {:?}", guard.name(), result);
            if !result.is_proceed() {
                debug_log!(
                    "Guard '{}' stopped navigation to '{}': {:?}",
                    guard.name(),
                    to.path(),
                    result
                );
                return Some(result);
            }
        }
        Some(GuardResult::Proceed)
    }
}

impl std::fmt::Debug for GuardChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardChain")
            .field("guards", &self.names())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{match_route, RouteDefinition, RouteTable, ViewLoader};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn matched(path: &str) -> MatchedRoute {
        let table = RouteTable::register(vec![
            RouteDefinition::new("/signin", "signin", ViewLoader::eager("SignIn")),
            RouteDefinition::new("/dashboard", "dashboard", ViewLoader::eager("Dashboard")),
        ])
        .unwrap();
        match_route(path, &table).unwrap()
    }

    fn counted(counter: Arc<AtomicUsize>, result: GuardResult) -> impl RouteGuard {
        guard_fn(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            result.clone()
        })
    }

    #[test]
    fn test_guard_result_helpers() {
        assert!(GuardResult::Proceed.is_proceed());
        assert_eq!(GuardResult::redirect("/signin").redirect_path(), Some("/signin"));
        assert_eq!(GuardResult::abort("nope").abort_reason(), Some("nope"));
        assert!(GuardResult::abort("nope").is_abort());
        assert!(!GuardResult::redirect("/x").is_proceed());
    }

    #[test]
    fn test_empty_chain_proceeds() {
        let chain = GuardChain::new();
        let to = matched("/dashboard");
        assert_eq!(pollster::block_on(chain.run(&to, None)), GuardResult::Proceed);
    }

    #[test]
    fn test_short_circuit_on_abort() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));

        let mut chain = GuardChain::new();
        chain.push(counted(first.clone(), GuardResult::Proceed));
        chain.push(counted(second.clone(), GuardResult::abort("blocked")));
        chain.push(counted(third.clone(), GuardResult::Proceed));

        let to = matched("/dashboard");
        let result = pollster::block_on(chain.run(&to, None));

        assert_eq!(result, GuardResult::abort("blocked"));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_short_circuit_on_redirect() {
        let after = Arc::new(AtomicUsize::new(0));

        let mut chain = GuardChain::new();
        chain.push(guard_fn(|_, _| GuardResult::redirect("/signin")));
        chain.push(counted(after.clone(), GuardResult::abort("unreachable")));

        let to = matched("/dashboard");
        let result = pollster::block_on(chain.run(&to, None));

        assert_eq!(result.redirect_path(), Some("/signin"));
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_guard_aborts() {
        let after = Arc::new(AtomicUsize::new(0));

        let mut chain = GuardChain::new();
        chain.push(guard_fn(|_, _| panic!("session store unavailable")));
        chain.push(counted(after.clone(), GuardResult::Proceed));

        let to = matched("/dashboard");
        let result = pollster::block_on(chain.run(&to, None));

        let reason = result.abort_reason().unwrap();
        assert!(reason.contains("session store unavailable"));
        assert!(reason.contains("RouteGuard"));
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_async_guard_sees_from_route() {
        let mut chain = GuardChain::new();
        chain.push(async_guard_fn(|to, from| async move {
            match from {
                Some(from) if from.name() == "signin" && to.name() == "dashboard" => {
                    GuardResult::abort("came from signin")
                }
                _ => GuardResult::Proceed,
            }
        }));

        let to = matched("/dashboard");
        let from = matched("/signin");
        assert!(pollster::block_on(chain.run(&to, None)).is_proceed());
        assert!(pollster::block_on(chain.run(&to, Some(&from))).is_abort());
    }

    #[test]
    fn test_run_while_stops_when_superseded() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let current = Arc::new(AtomicUsize::new(1));

        let mut chain = GuardChain::new();
        let flip = current.clone();
        let seen = first.clone();
        chain.push(guard_fn(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            flip.store(0, Ordering::SeqCst);
            GuardResult::Proceed
        }));
        chain.push(counted(second.clone(), GuardResult::Proceed));

        let to = matched("/dashboard");
        let result = pollster::block_on(
            chain.run_while(&to, None, || current.load(Ordering::SeqCst) == 1),
        );

        assert_eq!(result, None);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_logging_guard_first_and_transparent() {
        let chain = GuardChain::with_logging();
        assert_eq!(chain.names(), vec!["LoggingGuard"]);

        let to = matched("/signin");
        assert!(pollster::block_on(chain.run(&to, None)).is_proceed());
    }
}
