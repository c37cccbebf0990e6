//! View loading: eager views and lazily produced, memoized ones.
//!
//! - [`ViewLoader::Eager`] holds a view that already exists. Resolving it is
//!   immediate and cannot fail.
//! - [`ViewLoader::Lazy`] holds a production function returning a future.
//!   The first successful result is cached for as long as the owning
//!   [`RouteTable`](crate::RouteTable) lives. A failed production leaves the
//!   cache empty, so the next navigation to the route simply tries again.
//!
//! Concurrent resolutions of the same lazy loader are serialized: while one
//! production is in flight, other callers wait for it instead of starting a
//! second one. Dropping a resolution future mid-load drops the production
//! future with it and leaves the cache empty.
//!
//! # Example
//!
//! ```
//! use view_navigator::error::LoadError;
//! use view_navigator::{ViewLoader, ViewRef};
//!
//! let dashboard =
//!     ViewLoader::lazy(|| async { Ok::<_, LoadError>(ViewRef::new("StudentDashboard")) });
//! assert!(dashboard.is_lazy());
//! assert!(!dashboard.is_loaded());
//!
//! let view = pollster::block_on(dashboard.resolve("dashboard")).unwrap();
//! assert_eq!(view.downcast_ref::<&str>(), Some(&"StudentDashboard"));
//! assert!(dashboard.is_loaded());
//! ```

use crate::error::{LoadError, NavigationError};
use crate::{debug_log, error_log, trace_log, ViewRef};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Future returned by a lazy view producer.
pub type ViewFuture = BoxFuture<'static, Result<ViewRef, LoadError>>;

/// Shared lazy view producer.
pub type ViewProducer = Arc<dyn Fn() -> ViewFuture + Send + Sync>;

/// How a route's view is obtained.
pub enum ViewLoader {
    /// Already materialized.
    Eager(ViewRef),
    /// Produced on first use, then cached.
    Lazy(LazyView),
}

/// Deferred, memoized view production.
pub struct LazyView {
    producer: ViewProducer,
    cell: OnceCell<ViewRef>,
}

impl LazyView {
    /// Wrap a producer.
    pub fn new(producer: ViewProducer) -> Self {
        Self {
            producer,
            cell: OnceCell::new(),
        }
    }

    /// Cached view, if a production has succeeded.
    pub fn cached(&self) -> Option<&ViewRef> {
        self.cell.get()
    }

    async fn resolve(&self, route: &str) -> Result<ViewRef, LoadError> {
        if let Some(view) = self.cell.get() {
            trace_log!("Lazy view for '{}' served from cache", route);
            return Ok(view.clone());
        }

        debug_log!("Loading lazy view for '{}'", route);
        let view = self.cell.get_or_try_init(|| (self.producer)()).await?;
        Ok(view.clone())
    }
}

impl ViewLoader {
    /// Eager loader for an already constructed view.
    pub fn eager<T: Any + Send + Sync>(view: T) -> Self {
        ViewLoader::Eager(ViewRef::new(view))
    }

    /// Lazy loader from an async production function.
    pub fn lazy<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ViewRef, LoadError>> + Send + 'static,
    {
        ViewLoader::Lazy(LazyView::new(Arc::new(move || producer().boxed())))
    }

    /// `true` for the lazy variant.
    pub fn is_lazy(&self) -> bool {
        matches!(self, ViewLoader::Lazy(_))
    }

    /// `true` once a view is available without suspending.
    pub fn is_loaded(&self) -> bool {
        match self {
            ViewLoader::Eager(_) => true,
            ViewLoader::Lazy(lazy) => lazy.cached().is_some(),
        }
    }

    /// Resolve the view, running the lazy producer if needed.
    ///
    /// `route` names the owning route in a [`NavigationError::LoadFailure`].
    pub async fn resolve(&self, route: &str) -> Result<ViewRef, NavigationError> {
        match self {
            ViewLoader::Eager(view) => Ok(view.clone()),
            ViewLoader::Lazy(lazy) => lazy.resolve(route).await.map_err(|source| {
                error_log!("Failed to load view for '{}': {}", route, source);
                NavigationError::LoadFailure {
                    route: route.to_string(),
                    source: Arc::from(source),
                }
            }),
        }
    }
}

impl From<ViewRef> for ViewLoader {
    fn from(view: ViewRef) -> Self {
        ViewLoader::Eager(view)
    }
}

impl fmt::Debug for ViewLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewLoader::Eager(view) => f.debug_tuple("Eager").field(view).finish(),
            ViewLoader::Lazy(lazy) => f
                .debug_struct("Lazy")
                .field("loaded", &lazy.cached().is_some())
                .finish_non_exhaustive(),
        }
    }
}
