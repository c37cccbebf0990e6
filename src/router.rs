//! Navigation controller.
//!
//! [`Router`] owns a [`RouteTable`], a [`GuardChain`] and the
//! [`ActiveNavigationState`], and runs every navigation through the same
//! pipeline:
//!
//! 1. **Matching** - resolve the path against the table (no match ends in
//!    [`NavigationOutcome::NotFound`])
//! 2. **Guarding** - run the guard chain against `(to, from)`; a redirect
//!    goes back to step 1 with the same sequence number
//! 3. **Loading** - resolve the route's view
//! 4. **Committed** - record the new route and notify listeners
//!
//! # Staleness
//!
//! Every call to [`Router::navigate_to`] takes the next sequence number. A
//! navigation re-checks that its number is still the latest each time a
//! guard resumes, after the view resolves, and again under the state lock
//! when it commits. Listener notifications are serialized in commit order. A superseded navigation ends in
//! [`NavigationOutcome::Cancelled`] and leaves no trace in the router.
//!
//! # Redirect limit
//!
//! Guards may redirect at most [`RouterConfig::max_redirects`] times per
//! navigation (default [`DEFAULT_MAX_REDIRECTS`]). One more redirect fails
//! with [`NavigationError::RedirectLoop`] listing every path visited.
//!
//! # Example
//!
//! ```
//! use view_navigator::{RouteDefinition, RouteTable, Router, ViewLoader};
//!
//! let table = RouteTable::register(vec![
//!     RouteDefinition::new("/", "home", ViewLoader::eager("HomeView")),
//!     RouteDefinition::new("/signup", "signup", ViewLoader::eager("SignUp")),
//! ])
//! .unwrap();
//! let router = Router::builder(table).max_redirects(3).build();
//!
//! let outcome = pollster::block_on(router.navigate_to("/signup/")).unwrap();
//! assert_eq!(outcome.route().map(|r| r.name()), Some("signup"));
//! assert_eq!(router.latest_sequence(), 1);
//! ```

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, MatchCache};
use crate::error::NavigationError;
use crate::guards::{self, GuardChain, GuardResult, RouteGuard};
use crate::listener::{NavigationListener, RouteChangeEvent};
use crate::loader::ViewLoader;
use crate::matching::MatchedRoute;
use crate::route::RouteTable;
use crate::state::{ActiveNavigationState, NavigationPhase};
use crate::{debug_log, error_log, info_log, trace_log, warn_log, RouteParams, ViewRef};
use parking_lot::Mutex;
use std::sync::Arc;

/// Maximum number of guard redirects followed by one navigation.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Name reported in a load failure of the not-found fallback view.
const NOT_FOUND_ROUTE: &str = "not-found";

// ============================================================================
// RouterConfig
// ============================================================================

/// Tunables for a [`Router`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Redirects followed before a navigation fails with `RedirectLoop`
    pub max_redirects: usize,
    /// Put [`LoggingGuard`](crate::LoggingGuard) at position 0 of the chain
    pub logging_guard: bool,
    /// Paths kept in the match cache
    #[cfg(feature = "cache")]
    pub cache_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            logging_guard: true,
            #[cfg(feature = "cache")]
            cache_capacity: MatchCache::DEFAULT_CAPACITY,
        }
    }
}

impl RouterConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the redirect limit.
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Enable or disable the built-in logging guard.
    pub fn logging_guard(mut self, enabled: bool) -> Self {
        self.logging_guard = enabled;
        self
    }

    /// Set the match cache capacity.
    #[cfg(feature = "cache")]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

// ============================================================================
// NavigationOutcome
// ============================================================================

/// How a navigation that did not fail ended.
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// The route is now active.
    Committed {
        /// Route that was committed
        route: MatchedRoute,
        /// Its resolved view
        view: ViewRef,
    },
    /// No route matched. The active route is unchanged.
    NotFound {
        /// Path that matched nothing, as last requested (after redirects)
        path: String,
        /// Fallback view, if the router has one
        fallback: Option<ViewRef>,
    },
    /// A guard stopped the navigation. The active route is unchanged.
    Aborted {
        /// Path the guard rejected
        path: String,
        /// Reason given by the guard
        reason: String,
    },
    /// A newer navigation was initiated before this one could commit.
    Cancelled {
        /// Path this navigation was handling when it noticed
        path: String,
        /// Sequence number of the superseded navigation
        sequence: u64,
    },
}

impl NavigationOutcome {
    /// Terminal phase this outcome corresponds to.
    pub fn phase(&self) -> NavigationPhase {
        match self {
            Self::Committed { .. } => NavigationPhase::Committed,
            Self::NotFound { .. } => NavigationPhase::NotFound,
            Self::Aborted { .. } => NavigationPhase::Aborted,
            Self::Cancelled { .. } => NavigationPhase::Cancelled,
        }
    }

    /// Check if the navigation committed.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// Check if no route matched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if a guard aborted the navigation.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }

    /// Check if the navigation was superseded.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Committed route, if any.
    pub fn route(&self) -> Option<&MatchedRoute> {
        match self {
            Self::Committed { route, .. } => Some(route),
            _ => None,
        }
    }

    /// View to render: the committed view or the not-found fallback.
    pub fn view(&self) -> Option<&ViewRef> {
        match self {
            Self::Committed { view, .. } => Some(view),
            Self::NotFound { fallback, .. } => fallback.as_ref(),
            _ => None,
        }
    }

    /// Abort reason, if a guard aborted.
    pub fn abort_reason(&self) -> Option<&str> {
        match self {
            Self::Aborted { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

// ============================================================================
// RouterBuilder
// ============================================================================

/// Builder for [`Router`].
///
/// ```
/// use view_navigator::{listener_fn, GuardResult, RouteDefinition, RouteTable, Router, ViewLoader};
///
/// let table = RouteTable::register(vec![RouteDefinition::new(
///     "/",
///     "home",
///     ViewLoader::eager("HomeView"),
/// )])
/// .unwrap();
///
/// let router = Router::builder(table)
///     .guard_fn(|_to, _from| GuardResult::Proceed)
///     .listener(listener_fn(|event| println!("now at {}", event.to)))
///     .not_found(ViewLoader::eager("NotFound"))
///     .build();
///
/// assert_eq!(router.guards().names(), vec!["LoggingGuard", "RouteGuard"]);
/// ```
pub struct RouterBuilder {
    table: RouteTable,
    guards: Vec<Arc<dyn RouteGuard>>,
    listeners: Vec<Arc<dyn NavigationListener>>,
    not_found: Option<ViewLoader>,
    config: RouterConfig,
}

impl RouterBuilder {
    /// Start building a router over `table`.
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            guards: Vec::new(),
            listeners: Vec::new(),
            not_found: None,
            config: RouterConfig::default(),
        }
    }

    /// Append a guard. Guards run in the order they are added.
    pub fn guard<G: RouteGuard>(mut self, guard: G) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Append an already shared guard.
    pub fn shared_guard(mut self, guard: Arc<dyn RouteGuard>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Append a guard built from a synchronous closure.
    pub fn guard_fn<F>(self, f: F) -> Self
    where
        F: Fn(&MatchedRoute, Option<&MatchedRoute>) -> GuardResult + Send + Sync + 'static,
    {
        self.guard(guards::guard_fn(f))
    }

    /// Register a listener notified after each commit.
    pub fn listener<L: NavigationListener>(mut self, listener: L) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// View handed back when no route matches.
    pub fn not_found(mut self, loader: ViewLoader) -> Self {
        self.not_found = Some(loader);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the redirect limit.
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.config.max_redirects = max_redirects;
        self
    }

    /// Leave the built-in logging guard out of the chain.
    pub fn without_logging_guard(mut self) -> Self {
        self.config.logging_guard = false;
        self
    }

    /// Build the router.
    pub fn build(self) -> Router {
        let mut chain = if self.config.logging_guard {
            GuardChain::with_logging()
        } else {
            GuardChain::new()
        };
        for guard in self.guards {
            chain.push_shared(guard);
        }

        debug_log!(
            "Router built: {} routes, guards {:?}, {} listeners",
            self.table.len(),
            chain.names(),
            self.listeners.len()
        );

        Router {
            #[cfg(feature = "cache")]
            match_cache: Mutex::new(MatchCache::with_capacity(self.config.cache_capacity)),
            table: self.table,
            guards: chain,
            listeners: self.listeners,
            not_found: self.not_found,
            config: self.config,
            state: Mutex::new(ActiveNavigationState::new()),
            notify: Mutex::new(()),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Runs navigations against a route table.
///
/// All methods take `&self`; share a router between tasks with an [`Arc`].
/// Navigations may overlap, and only the most recently initiated one can
/// commit.
pub struct Router {
    table: RouteTable,
    guards: GuardChain,
    listeners: Vec<Arc<dyn NavigationListener>>,
    not_found: Option<ViewLoader>,
    config: RouterConfig,
    state: Mutex<ActiveNavigationState>,
    notify: Mutex<()>,
    #[cfg(feature = "cache")]
    match_cache: Mutex<MatchCache>,
}

impl Router {
    /// Start building a router over `table`.
    pub fn builder(table: RouteTable) -> RouterBuilder {
        RouterBuilder::new(table)
    }

    /// Router with the default configuration and no guards besides logging.
    pub fn new(table: RouteTable) -> Self {
        RouterBuilder::new(table).build()
    }

    // ========================================================================
    // Navigation pipeline
    // ========================================================================

    /// Navigate to a path.
    ///
    /// `Ok` covers every outcome that leaves the router consistent, including
    /// not-found, aborted and cancelled navigations. `Err` is returned for a
    /// failed view load or a redirect loop; the active route is unchanged in
    /// both cases.
    pub async fn navigate_to(
        &self,
        path: impl Into<String>,
    ) -> Result<NavigationOutcome, NavigationError> {
        let mut target = path.into();
        let (sequence, from) = {
            let mut state = self.state.lock();
            (state.begin(), state.committed_route().cloned())
        };
        info_log!(
            "Navigation #{}: '{}' → '{}'",
            sequence,
            from.as_ref().map_or("<none>", MatchedRoute::path),
            target
        );

        let mut hops = vec![target.clone()];
        loop {
            trace_log!("Navigation #{} {:?}: '{}'", sequence, NavigationPhase::Matching, target);
            let Some(to) = self.match_target(&target) else {
                return self.finish_not_found(sequence, target).await;
            };

            trace_log!("Navigation #{} {:?}: '{}'", sequence, NavigationPhase::Guarding, to.name());
            let Some(decision) = self
                .guards
                .run_while(&to, from.as_ref(), || self.is_current(sequence))
                .await
            else {
                return Ok(self.cancelled(sequence, to.full_path()));
            };

            match decision {
                GuardResult::Proceed => return self.load_and_commit(sequence, to).await,
                GuardResult::Abort(reason) => {
                    warn_log!(
                        "Navigation #{} to '{}' aborted: {}",
                        sequence,
                        to.path(),
                        reason
                    );
                    return Ok(NavigationOutcome::Aborted {
                        path: to.full_path(),
                        reason,
                    });
                }
                GuardResult::Redirect(next) => {
                    hops.push(next.clone());
                    if hops.len() - 1 > self.config.max_redirects {
                        error_log!(
                            "Redirect loop detected (limit {}): {}",
                            self.config.max_redirects,
                            hops.join(" -> ")
                        );
                        return Err(NavigationError::RedirectLoop {
                            limit: self.config.max_redirects,
                            hops,
                        });
                    }
                    debug_log!(
                        "Navigation #{} redirected from '{}' to '{}'",
                        sequence,
                        to.path(),
                        next
                    );
                    target = next;
                }
            }
        }
    }

    /// Navigate to a named route, substituting `params` into its pattern.
    ///
    /// Fails with [`NavigationError::UnknownRouteName`] or
    /// [`NavigationError::MissingParam`] before any navigation starts.
    pub async fn navigate_to_name(
        &self,
        name: &str,
        params: &RouteParams,
    ) -> Result<NavigationOutcome, NavigationError> {
        let path = self.table.url_for(name, params).map_err(|err| {
            warn_log!("Named navigation failed: {}", err);
            err
        })?;
        self.navigate_to(path).await
    }

    async fn load_and_commit(
        &self,
        sequence: u64,
        to: MatchedRoute,
    ) -> Result<NavigationOutcome, NavigationError> {
        trace_log!("Navigation #{} {:?}: '{}'", sequence, NavigationPhase::Loading, to.name());
        let loaded = to.definition().loader().resolve(to.name()).await;
        if !self.is_current(sequence) {
            return Ok(self.cancelled(sequence, to.full_path()));
        }
        let view = loaded?;

        // Lock order is notify, then state. Holding notify from commit until
        // the last listener returns keeps notifications in commit order.
        let _notify = self.notify.lock();
        let committed = self.state.lock().commit(sequence, to.clone(), view.clone());
        let previous = match committed {
            Ok(previous) => previous,
            Err(superseded) => {
                debug_log!("Commit skipped: {}", superseded);
                return Ok(self.cancelled(sequence, to.full_path()));
            }
        };

        info_log!(
            "Navigation #{} committed: '{}' (route '{}')",
            sequence,
            to.full_path(),
            to.name()
        );

        if !self.listeners.is_empty() {
            let event = RouteChangeEvent {
                from: previous.as_ref().map(MatchedRoute::full_path),
                to: to.full_path(),
                route_name: to.name().to_string(),
                sequence,
            };
            for listener in &self.listeners {
                trace_log!("Notifying listener '{}'", listener.name());
                listener.on_committed(&event);
            }
        }

        Ok(NavigationOutcome::Committed { route: to, view })
    }

    async fn finish_not_found(
        &self,
        sequence: u64,
        path: String,
    ) -> Result<NavigationOutcome, NavigationError> {
        warn_log!("Navigation #{}: no route matches '{}'", sequence, path);

        let fallback = match &self.not_found {
            Some(loader) => Some(loader.resolve(NOT_FOUND_ROUTE).await),
            None => None,
        };

        let _notify = self.notify.lock();
        if !self.is_current(sequence) {
            return Ok(self.cancelled(sequence, path));
        }
        let fallback = fallback.transpose()?;

        for listener in &self.listeners {
            listener.on_not_found(&path);
        }
        Ok(NavigationOutcome::NotFound { path, fallback })
    }

    fn cancelled(&self, sequence: u64, path: String) -> NavigationOutcome {
        debug_log!(
            "Navigation #{} to '{}' cancelled: superseded by #{}",
            sequence,
            path,
            self.latest_sequence()
        );
        NavigationOutcome::Cancelled { path, sequence }
    }

    fn is_current(&self, sequence: u64) -> bool {
        self.state.lock().is_current(sequence)
    }

    #[cfg(feature = "cache")]
    fn match_target(&self, target: &str) -> Option<MatchedRoute> {
        use crate::matching::{find_route, normalize_path, split_target};

        let parts = split_target(target);
        let normalized = normalize_path(parts.path);

        let cached = self.match_cache.lock().get(&normalized);
        if let Some((index, params)) = cached {
            if let Some(route) = self.table.get(index) {
                return Some(MatchedRoute::new(
                    Arc::clone(route),
                    params,
                    normalized.into_owned(),
                    parts,
                ));
            }
        }

        let (route, params) = find_route(&self.table, &normalized)?;
        self.match_cache
            .lock()
            .insert(normalized.to_string(), route.index(), params.clone());
        Some(MatchedRoute::new(route, params, normalized.into_owned(), parts))
    }

    #[cfg(not(feature = "cache"))]
    fn match_target(&self, target: &str) -> Option<MatchedRoute> {
        crate::matching::match_route(target, &self.table)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Most recently committed route.
    pub fn current_route(&self) -> Option<MatchedRoute> {
        self.state.lock().committed_route().cloned()
    }

    /// View of the most recently committed route.
    pub fn current_view(&self) -> Option<ViewRef> {
        self.state.lock().committed_view().cloned()
    }

    /// Path of the most recently committed route, with query and fragment.
    pub fn current_path(&self) -> Option<String> {
        self.state.lock().committed_route().map(MatchedRoute::full_path)
    }

    /// Sequence number of the most recently initiated navigation.
    pub fn latest_sequence(&self) -> u64 {
        self.state.lock().latest_initiated()
    }

    /// The route table.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The guard chain, including the logging guard when enabled.
    pub fn guards(&self) -> &GuardChain {
        &self.guards
    }

    /// Active configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Snapshot of the match cache statistics.
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.match_cache.lock().stats().clone()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("guards", &self.guards)
            .field("listeners", &self.listeners.len())
            .field("config", &self.config)
            .field("current", &self.current_path())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
