//! # View Navigator
//!
//! Route resolution and navigation-guard pipeline for single-page style
//! applications:
//!
//! - **Route Table** - named routes with static and `:param` segments,
//!   validated once at startup
//! - **Path Matcher** - specificity-ordered matching with parameter binding
//! - **View Loader** - eager views and lazily produced, memoized views
//! - **Guard Chain** - ordered async interceptors that proceed, redirect, or abort
//! - **Navigation Controller** - sequences navigations so that only the most
//!   recently initiated one can commit
//!
//! Rendering is not part of this crate. A view is an opaque [`ViewRef`]
//! handed to whatever renders it.
//!
//! # Quick Start
//!
//! ```
//! use view_navigator::error::LoadError;
//! use view_navigator::{
//!     guard_fn, GuardResult, RouteDefinition, RouteTable, Router, ViewLoader, ViewRef,
//! };
//!
//! let table = RouteTable::register(vec![
//!     RouteDefinition::new("/", "home", ViewLoader::eager("HomeView")),
//!     RouteDefinition::new("/signin", "signin", ViewLoader::eager("SignIn")),
//!     RouteDefinition::new(
//!         "/dashboard",
//!         "dashboard",
//!         ViewLoader::lazy(|| async { Ok::<_, LoadError>(ViewRef::new("StudentDashboard")) }),
//!     ),
//! ])
//! .unwrap();
//!
//! let router = Router::builder(table)
//!     .guard(guard_fn(|to, _from| {
//!         if to.name() == "dashboard" {
//!             GuardResult::redirect("/signin")
//!         } else {
//!             GuardResult::Proceed
//!         }
//!     }))
//!     .build();
//!
//! let outcome = pollster::block_on(router.navigate_to("/dashboard")).unwrap();
//! assert!(outcome.is_committed());
//! assert_eq!(router.current_path().as_deref(), Some("/signin"));
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache of path match results

#![cfg_attr(docsrs, feature(doc_cfg))]

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Core routing modules
pub mod guards;
pub mod listener;
pub mod loader;
pub mod matching;
pub mod params;
pub mod route;
pub mod router;
pub mod state;

// Error handling
pub mod error;

#[cfg(feature = "cache")]
pub use cache::{CacheStats, MatchCache};
pub use error::{LoadError, NavigationError, RouteTableError};
pub use guards::{async_guard_fn, guard_fn, GuardChain, GuardResult, LoggingGuard, RouteGuard};
pub use listener::{listener_fn, NavigationListener, RouteChangeEvent};
pub use loader::{LazyView, ViewLoader};
pub use matching::{match_route, MatchedRoute};
pub use params::RouteParams;
pub use route::{PathPattern, Route, RouteDefinition, RouteTable, Segment};
pub use router::{
    NavigationOutcome, Router, RouterBuilder, RouterConfig, DEFAULT_MAX_REDIRECTS,
};
pub use state::{ActiveNavigationState, NavigationPhase, Superseded};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque handle to a renderable view.
///
/// The navigator only moves these around; it never looks inside. Cloning is
/// cheap and clones compare equal under [`ptr_eq`](Self::ptr_eq).
///
/// # Example
///
/// ```
/// use view_navigator::ViewRef;
///
/// let view = ViewRef::new(String::from("SignUp"));
/// assert_eq!(view.downcast_ref::<String>().map(String::as_str), Some("SignUp"));
/// assert!(view.ptr_eq(&view.clone()));
/// ```
#[derive(Clone)]
pub struct ViewRef(Arc<dyn Any + Send + Sync>);

impl ViewRef {
    /// Wrap any value as a view handle.
    pub fn new<T: Any + Send + Sync>(view: T) -> Self {
        Self(Arc::new(view))
    }

    /// Borrow the wrapped value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// `true` if both handles point at the same view.
    pub fn ptr_eq(&self, other: &ViewRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRef").finish_non_exhaustive()
    }
}
