//! Path normalization and matching.
//!
//! # Normalization rules
//!
//! 1. Anything after `?` (query) or `#` (fragment) is split off and carried
//!    through untouched; it never takes part in matching.
//! 2. A leading slash is ensured (`"signin"` → `"/signin"`).
//! 3. Repeated slashes collapse (`"//dashboard"` → `"/dashboard"`).
//! 4. A trailing slash is removed except for root (`"/feedback/"` → `"/feedback"`).
//! 5. `""`, `"/"` and `"//"` all normalize to `"/"`.
//!
//! # Matching
//!
//! [`match_route`] tries candidates in the table's specificity order. A
//! literal segment must be equal (case-sensitive), a `:param` segment accepts
//! any non-empty segment and binds it. The segment counts must be equal.

use crate::route::{PathPattern, Route, RouteTable, Segment};
use crate::{trace_log, RouteParams};
use std::borrow::Cow;
use std::sync::Arc;

/// A navigation target split into its path, query and fragment parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    /// Raw path portion, not yet normalized
    pub path: &'a str,
    /// Text after `?`, without the `?`
    pub query: Option<&'a str>,
    /// Text after `#`, without the `#`
    pub fragment: Option<&'a str>,
}

/// Split `target` into path, query and fragment.
///
/// ```ignore
/// let t = split_target("/dashboard?tab=grades#top");
/// assert_eq!(t.path, "/dashboard");
/// assert_eq!(t.query, Some("tab=grades"));
/// assert_eq!(t.fragment, Some("top"));
/// ```
pub fn split_target(target: &str) -> Target<'_> {
    let (rest, fragment) = match target.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (target, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    Target {
        path,
        query,
        fragment,
    }
}

/// Normalize a path, borrowing when it is already normalized.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let already = path.starts_with('/')
        && !path.contains("//")
        && (path.len() == 1 || !path.ends_with('/'));
    if already {
        return Cow::Borrowed(path);
    }

    let segments = split_path(path);
    if segments.is_empty() {
        return Cow::Borrowed("/");
    }
    Cow::Owned(format!("/{}", segments.join("/")))
}

/// Split a path into its non-empty segments.
///
/// ```ignore
/// assert_eq!(split_path("/users/123"), vec!["users", "123"]);
/// assert_eq!(split_path("/"), Vec::<&str>::new());
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Match path segments against one pattern, binding its parameters.
pub fn match_pattern(pattern: &PathPattern, segments: &[&str]) -> Option<RouteParams> {
    if pattern.segments().len() != segments.len() {
        return None;
    }

    let mut params = RouteParams::new();
    for (pattern_seg, path_seg) in pattern.segments().iter().zip(segments) {
        match pattern_seg {
            Segment::Literal(lit) if lit == path_seg => {}
            Segment::Param(name) if !path_seg.is_empty() => params.insert(name.as_str(), *path_seg),
            _ => return None,
        }
    }
    Some(params)
}

/// Find the route for an already-normalized path.
pub fn find_route(table: &RouteTable, normalized: &str) -> Option<(Arc<Route>, RouteParams)> {
    if let Some(route) = table.static_route(normalized) {
        trace_log!("Static match '{}' → '{}'", normalized, route.name());
        return Some((Arc::clone(route), RouteParams::new()));
    }

    let segments = split_path(normalized);
    table
        .match_order_indices()
        .iter()
        .filter_map(|&i| table.get(i))
        .filter(|route| !route.pattern().is_static())
        .find_map(|route| {
            match_pattern(route.pattern(), &segments).map(|params| {
                trace_log!(
                    "Pattern match '{}' → '{}' ({} params)",
                    normalized,
                    route.pattern(),
                    params.len()
                );
                (Arc::clone(route), params)
            })
        })
}

/// Match a navigation target (path with optional query/fragment) against the table.
///
/// Returns `None` when no route matches; callers treat that as a
/// recoverable not-found condition.
pub fn match_route(target: &str, table: &RouteTable) -> Option<MatchedRoute> {
    let parts = split_target(target);
    let normalized = normalize_path(parts.path);
    let (route, params) = find_route(table, &normalized)?;
    Some(MatchedRoute::new(route, params, normalized.into_owned(), parts))
}

// ============================================================================
// MatchedRoute
// ============================================================================

/// A route matched for one navigation, with its bound parameters.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
    route: Arc<Route>,
    params: RouteParams,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl MatchedRoute {
    pub(crate) fn new(
        route: Arc<Route>,
        params: RouteParams,
        path: String,
        parts: Target<'_>,
    ) -> Self {
        Self {
            route,
            params,
            path,
            query: parts.query.map(str::to_string),
            fragment: parts.fragment.map(str::to_string),
        }
    }

    /// The registered route that matched.
    pub fn definition(&self) -> &Arc<Route> {
        &self.route
    }

    /// Name of the matched route.
    pub fn name(&self) -> &str {
        self.route.name()
    }

    /// Bound path parameters.
    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// Normalized path, without query or fragment.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, passed through verbatim.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Raw fragment, passed through verbatim.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Path with query and fragment re-attached, as reported to the history source.
    pub fn full_path(&self) -> String {
        let mut full = self.path.clone();
        if let Some(query) = &self.query {
            full.push('?');
            full.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            full.push('#');
            full.push_str(fragment);
        }
        full
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RouteDefinition, ViewLoader};

    fn table(paths: &[(&str, &str)]) -> RouteTable {
        RouteTable::register(
            paths
                .iter()
                .map(|(path, name)| RouteDefinition::new(*path, *name, ViewLoader::eager(name.to_string()))),
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/dashboard"), "/dashboard");
        assert_eq!(normalize_path("dashboard"), "/dashboard");
        assert_eq!(normalize_path("/dashboard/"), "/dashboard");
        assert_eq!(normalize_path("//dashboard//grades"), "/dashboard/grades");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("//"), "/");
    }

    #[test]
    fn test_normalize_borrows_when_clean() {
        assert!(matches!(normalize_path("/signin"), Cow::Borrowed(_)));
        assert!(matches!(normalize_path("/signin/"), Cow::Owned(_)));
    }

    #[test]
    fn test_split_target() {
        let t = split_target("/dashboard?tab=grades#top");
        assert_eq!(t.path, "/dashboard");
        assert_eq!(t.query, Some("tab=grades"));
        assert_eq!(t.fragment, Some("top"));

        let t = split_target("/feedback#form?not-a-query");
        assert_eq!(t.path, "/feedback");
        assert_eq!(t.query, None);
        assert_eq!(t.fragment, Some("form?not-a-query"));
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/users/123"), vec!["users", "123"]);
        assert_eq!(split_path("/"), Vec::<&str>::new());
        assert_eq!(split_path(""), Vec::<&str>::new());
        assert_eq!(split_path("/users/"), vec!["users"]);
    }

    #[test]
    fn test_match_pattern_binds_params() {
        let pattern = PathPattern::parse("/courses/:courseId/lessons/:lessonId").unwrap();
        let params = match_pattern(&pattern, &["courses", "7", "lessons", "intro"]).unwrap();
        assert_eq!(params.get("courseId"), Some("7"));
        assert_eq!(params.get("lessonId"), Some("intro"));
    }

    #[test]
    fn test_match_pattern_rejects_length_mismatch() {
        let pattern = PathPattern::parse("/users/:id").unwrap();
        assert!(match_pattern(&pattern, &["users"]).is_none());
        assert!(match_pattern(&pattern, &["users", "1", "edit"]).is_none());
    }

    #[test]
    fn test_literal_is_case_sensitive() {
        let t = table(&[("/signup", "signup")]);
        assert!(match_route("/signup", &t).is_some());
        assert!(match_route("/SignUp", &t).is_none());
    }

    #[test]
    fn test_static_beats_param_regardless_of_order() {
        let t = table(&[("/:id", "by-id"), ("/signup", "signup")]);
        assert_eq!(match_route("/signup", &t).unwrap().name(), "signup");
        assert_eq!(match_route("/42", &t).unwrap().name(), "by-id");

        let t = table(&[("/signup", "signup"), ("/:id", "by-id")]);
        assert_eq!(match_route("/signup", &t).unwrap().name(), "signup");
    }

    #[test]
    fn test_static_position_precedence() {
        let t = table(&[("/users/:id/edit", "edit"), ("/users/new/:tab", "new-tab")]);
        let m = match_route("/users/new/edit", &t).unwrap();
        assert_eq!(m.name(), "new-tab");
        assert_eq!(m.params().get("tab"), Some("edit"));
    }

    #[test]
    fn test_first_registered_wins_on_tie() {
        let t = table(&[("/:id", "by-id"), ("/:slug", "by-slug")]);
        let m = match_route("/intro", &t).unwrap();
        assert_eq!(m.name(), "by-id");
        assert_eq!(m.params().get("id"), Some("intro"));
    }

    #[test]
    fn test_nested_literal_paths() {
        let t = table(&[("/instructor", "instructor"), ("/instructor/insights", "insights")]);
        assert_eq!(match_route("/instructor/insights", &t).unwrap().name(), "insights");
        assert_eq!(match_route("/instructor/", &t).unwrap().name(), "instructor");
        assert!(match_route("/instructor/insights/extra", &t).is_none());
    }

    #[test]
    fn test_root_and_query_passthrough() {
        let t = table(&[("/", "home"), ("/dashboard", "dashboard")]);
        assert_eq!(match_route("", &t).unwrap().name(), "home");

        let m = match_route("/dashboard/?tab=grades#top", &t).unwrap();
        assert_eq!(m.path(), "/dashboard");
        assert_eq!(m.query(), Some("tab=grades"));
        assert_eq!(m.fragment(), Some("top"));
        assert_eq!(m.full_path(), "/dashboard?tab=grades#top");
    }

    #[test]
    fn test_no_match() {
        let t = table(&[("/", "home")]);
        assert!(match_route("/missing", &t).is_none());
    }
}
