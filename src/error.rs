//! Error types for the navigator.
//!
//! Two families of failures exist and they never mix:
//!
//! - [`RouteTableError`] - construction-time faults. A table that fails to
//!   build is never handed out, so a router cannot run on a half-registered
//!   set of routes.
//! - [`NavigationError`] - per-navigation faults. They are returned to the
//!   caller of [`Router::navigate_to`](crate::Router::navigate_to) and leave
//!   the active route untouched.
//!
//! Recoverable conditions that are *not* errors (a path with no route, a
//! guard rejecting a navigation, a navigation superseded by a newer one) are
//! reported through [`NavigationOutcome`](crate::NavigationOutcome) instead.
//!
//! # Examples
//!
//! ```
//! use view_navigator::error::NavigationError;
//!
//! let err = NavigationError::UnknownRouteName { name: "settings".into() };
//! assert_eq!(err.to_string(), "Unknown route name: settings");
//! ```

use std::sync::Arc;
use thiserror::Error;

/// Error returned by a lazy view producer.
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while building a [`RouteTable`](crate::RouteTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    /// Two definitions share the same name.
    #[error("Duplicate route name: {name}")]
    DuplicateName { name: String },

    /// Two static patterns are identical.
    #[error("Conflicting static pattern '{path}' registered by '{first}' and '{second}'")]
    ConflictingPattern {
        path: String,
        first: String,
        second: String,
    },

    /// The pattern itself is malformed.
    #[error("Invalid route pattern '{path}': {reason}")]
    InvalidPattern { path: String, reason: String },
}

/// Failure of a single navigation.
#[derive(Debug, Clone, Error)]
pub enum NavigationError {
    /// `navigate_to_name` was called with a name the table does not know.
    #[error("Unknown route name: {name}")]
    UnknownRouteName { name: String },

    /// `navigate_to_name` was called without a parameter the pattern needs.
    #[error("Route '{route}' requires parameter '{param}'")]
    MissingParam { route: String, param: String },

    /// A parameter value would change the path structure (`/`, `?` or `#`).
    #[error("Invalid value '{value}' for parameter '{param}' of route '{route}'")]
    InvalidParam {
        route: String,
        param: String,
        value: String,
    },

    /// A lazy view producer failed. The loader stays retryable.
    #[error("Failed to load view for route '{route}': {source}")]
    LoadFailure {
        route: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Guards kept redirecting past the configured limit.
    #[error("Redirect loop detected after {limit} redirects: {}", .hops.join(" -> "))]
    RedirectLoop { limit: usize, hops: Vec<String> },
}

impl NavigationError {
    /// Check if this is a lazy load failure
    pub fn is_load_failure(&self) -> bool {
        matches!(self, NavigationError::LoadFailure { .. })
    }

    /// Check if this is a redirect loop
    pub fn is_redirect_loop(&self) -> bool {
        matches!(self, NavigationError::RedirectLoop { .. })
    }

    /// Redirect path sequence for [`RedirectLoop`](Self::RedirectLoop) errors.
    pub fn redirect_hops(&self) -> Option<&[String]> {
        match self {
            NavigationError::RedirectLoop { hops, .. } => Some(hops.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_display() {
        let err = RouteTableError::DuplicateName {
            name: "home".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate route name: home");
    }

    #[test]
    fn test_conflicting_pattern_display() {
        let err = RouteTableError::ConflictingPattern {
            path: "/signup".to_string(),
            first: "signup".to_string(),
            second: "register".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Conflicting static pattern '/signup' registered by 'signup' and 'register'"
        );
    }

    #[test]
    fn test_redirect_loop_lists_hops() {
        let err = NavigationError::RedirectLoop {
            limit: 2,
            hops: vec!["/a".to_string(), "/b".to_string(), "/a".to_string()],
        };
        assert!(err.is_redirect_loop());
        assert_eq!(err.redirect_hops().map(<[String]>::len), Some(3));
        assert_eq!(
            err.to_string(),
            "Redirect loop detected after 2 redirects: /a -> /b -> /a"
        );
    }

    #[test]
    fn test_invalid_param_display() {
        let err = NavigationError::InvalidParam {
            route: "course".to_string(),
            param: "courseId".to_string(),
            value: "a/b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'a/b' for parameter 'courseId' of route 'course'"
        );
    }

    #[test]
    fn test_load_failure_keeps_source() {
        let cause: LoadError = "connection reset".into();
        let err = NavigationError::LoadFailure {
            route: "dashboard".to_string(),
            source: Arc::from(cause),
        };
        assert!(err.is_load_failure());
        assert_eq!(
            err.to_string(),
            "Failed to load view for route 'dashboard': connection reset"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
