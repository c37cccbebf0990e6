//! Route definitions and the route table.
//!
//! A [`RouteDefinition`] is the declarative input: a path pattern, a unique
//! name and a [`ViewLoader`]. [`RouteTable::register`] validates a whole set
//! of definitions at once and either produces a usable table or fails; there
//! is no partially populated table.
//!
//! # Pattern syntax
//!
//! | Segment      | Meaning                                        |
//! |--------------|------------------------------------------------|
//! | `signup`     | literal, matched exactly (case-sensitive)      |
//! | `:courseId`  | parameter, matches any non-empty segment       |
//!
//! # Match order
//!
//! Candidates are tried by specificity: fully static patterns first, then
//! patterns with fewer parameters, then the pattern whose first parameter
//! appears later, and finally registration order.
//!
//! ```
//! use view_navigator::{RouteDefinition, RouteTable, ViewLoader};
//!
//! let table = RouteTable::register(vec![
//!     RouteDefinition::new("/:slug", "page", ViewLoader::eager("page")),
//!     RouteDefinition::new("/signup", "signup", ViewLoader::eager("signup")),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.match_order()[0].name(), "signup");
//! ```

use crate::error::{NavigationError, RouteTableError};
use crate::loader::ViewLoader;
use crate::matching::{normalize_path, split_path};
use crate::{info_log, RouteParams};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Pattern
// ============================================================================

/// One segment of a parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Binds any non-empty path segment under this name.
    Param(String),
}

impl Segment {
    /// Check if this segment binds a parameter
    pub fn is_param(&self) -> bool {
        matches!(self, Segment::Param(_))
    }
}

/// A validated, normalized path pattern such as `/courses/:courseId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse and validate a pattern.
    ///
    /// The pattern must start with `/`. Repeated and trailing slashes are
    /// normalized away. Parameter names must be non-empty and unique within
    /// the pattern.
    pub fn parse(path: &str) -> Result<Self, RouteTableError> {
        let invalid = |reason: &str| RouteTableError::InvalidPattern {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }

        let raw = normalize_path(path).into_owned();
        let mut segments = Vec::new();
        let mut seen: Vec<&str> = Vec::new();

        for seg in split_path(&raw) {
            if let Some(name) = seg.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("parameter name must not be empty"));
                }
                if seen.contains(&name) {
                    return Err(invalid(&format!("parameter ':{}' appears twice", name)));
                }
                seen.push(name);
                segments.push(Segment::Param(name.to_string()));
            } else {
                segments.push(Segment::Literal(seg.to_string()));
            }
        }

        Ok(Self { raw, segments })
    }

    /// The normalized pattern text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed segments, root is empty.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of parameter segments.
    pub fn param_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_param()).count()
    }

    /// `true` if the pattern has no parameter segments.
    pub fn is_static(&self) -> bool {
        self.param_count() == 0
    }

    /// Names of the parameters, in segment order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Sort key: fewer params first, then static-before-param per position.
    fn specificity(&self) -> (usize, Vec<bool>) {
        (
            self.param_count(),
            self.segments.iter().map(Segment::is_param).collect(),
        )
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ============================================================================
// RouteDefinition / Route
// ============================================================================

/// Declarative description of one route, validated on registration.
#[derive(Debug)]
pub struct RouteDefinition {
    /// Path pattern, e.g. `/instructor/insights` or `/courses/:id`
    pub path: String,
    /// Unique route name used for programmatic navigation
    pub name: String,
    /// How the view for this route is produced
    pub loader: ViewLoader,
}

impl RouteDefinition {
    /// Create a new definition.
    pub fn new(path: impl Into<String>, name: impl Into<String>, loader: ViewLoader) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            loader,
        }
    }
}

/// A registered route. Shared by every [`MatchedRoute`](crate::MatchedRoute)
/// produced for it, so the lazy view cache lives as long as the table.
pub struct Route {
    index: usize,
    name: String,
    pattern: PathPattern,
    loader: ViewLoader,
}

impl Route {
    /// Route name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed path pattern.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// View loader (and its cache).
    pub fn loader(&self) -> &ViewLoader {
        &self.loader
    }

    /// Registration index inside the table.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("loader", &self.loader)
            .finish()
    }
}

// ============================================================================
// RouteTable
// ============================================================================

/// Immutable, validated set of routes.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    by_name: HashMap<String, usize>,
    by_static_path: HashMap<String, usize>,
    match_order: Vec<usize>,
}

impl RouteTable {
    /// Validate `definitions` and build the table.
    ///
    /// Fails on the first duplicate name, conflicting static pattern, or
    /// malformed pattern. Nothing is returned on failure.
    ///
    /// Static patterns are compared after normalization, so `/signup` and
    /// `/signup/` conflict: both would match exactly the same paths.
    pub fn register(
        definitions: impl IntoIterator<Item = RouteDefinition>,
    ) -> Result<Self, RouteTableError> {
        let mut routes: Vec<Arc<Route>> = Vec::new();
        let mut by_name = HashMap::new();
        let mut by_static_path: HashMap<String, usize> = HashMap::new();

        for (index, def) in definitions.into_iter().enumerate() {
            let pattern = PathPattern::parse(&def.path)?;

            if by_name.contains_key(&def.name) {
                return Err(RouteTableError::DuplicateName { name: def.name });
            }

            if pattern.is_static() {
                if let Some(&existing) = by_static_path.get(pattern.as_str()) {
                    return Err(RouteTableError::ConflictingPattern {
                        path: pattern.as_str().to_string(),
                        first: routes[existing].name.clone(),
                        second: def.name,
                    });
                }
                by_static_path.insert(pattern.as_str().to_string(), index);
            }

            by_name.insert(def.name.clone(), index);
            routes.push(Arc::new(Route {
                index,
                name: def.name,
                pattern,
                loader: def.loader,
            }));
        }

        let mut match_order: Vec<usize> = (0..routes.len()).collect();
        match_order.sort_by_cached_key(|&i| (routes[i].pattern.specificity(), i));

        for route in &routes {
            info_log!(
                "Registered route '{}' (name: '{}', {})",
                route.pattern,
                route.name,
                if route.loader.is_lazy() { "lazy" } else { "eager" }
            );
        }

        Ok(Self {
            routes,
            by_name,
            by_static_path,
            match_order,
        })
    }

    /// Find a route by its unique name.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Arc<Route>> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    /// All routes in registration order.
    pub fn all_definitions(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Routes in the order the matcher tries them.
    pub fn match_order(&self) -> Vec<&Arc<Route>> {
        self.match_order.iter().map(|&i| &self.routes[i]).collect()
    }

    pub(crate) fn match_order_indices(&self) -> &[usize] {
        &self.match_order
    }

    /// Route registered at `index`.
    pub fn get(&self, index: usize) -> Option<&Arc<Route>> {
        self.routes.get(index)
    }

    /// Exact lookup of a static pattern by normalized path.
    pub(crate) fn static_route(&self, normalized: &str) -> Option<&Arc<Route>> {
        self.by_static_path.get(normalized).map(|&i| &self.routes[i])
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// `true` if the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Build a concrete path for the named route by substituting `params`.
    ///
    /// Extra parameters are ignored. A value containing `/`, `?` or `#` is
    /// rejected with [`NavigationError::InvalidParam`].
    ///
    /// ```
    /// use view_navigator::{RouteDefinition, RouteParams, RouteTable, ViewLoader};
    ///
    /// let table = RouteTable::register(vec![RouteDefinition::new(
    ///     "/courses/:courseId/lessons/:lessonId",
    ///     "lesson",
    ///     ViewLoader::eager("lesson"),
    /// )])
    /// .unwrap();
    ///
    /// let params = RouteParams::new().with("courseId", "7").with("lessonId", "intro");
    /// assert_eq!(table.url_for("lesson", &params).unwrap(), "/courses/7/lessons/intro");
    /// ```
    pub fn url_for(&self, name: &str, params: &RouteParams) -> Result<String, NavigationError> {
        let route = self
            .lookup_by_name(name)
            .ok_or_else(|| NavigationError::UnknownRouteName {
                name: name.to_string(),
            })?;

        let mut url = String::new();
        for segment in route.pattern.segments() {
            url.push('/');
            match segment {
                Segment::Literal(lit) => url.push_str(lit),
                Segment::Param(param) => match params.get(param) {
                    Some(value) if value.contains(['/', '?', '#']) => {
                        return Err(NavigationError::InvalidParam {
                            route: name.to_string(),
                            param: param.clone(),
                            value: value.to_string(),
                        })
                    }
                    Some(value) if !value.is_empty() => url.push_str(value),
                    _ => {
                        return Err(NavigationError::MissingParam {
                            route: name.to_string(),
                            param: param.clone(),
                        })
                    }
                },
            }
        }

        if url.is_empty() {
            url.push('/');
        }
        Ok(url)
    }
}
