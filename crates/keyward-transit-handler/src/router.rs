//! Explicit routing table for transit operations.
//!
//! The table is built once at startup and maps an operation name and a path
//! pattern to the executor entry point. Nothing registers itself globally.

/// Request method a route answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read without side effects.
    Read,
    /// Create or modify.
    Update,
}

/// One entry of the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Operation name, as returned by `TransitRequest::operation`.
    pub operation: &'static str,
    /// Method this route answers to.
    pub method: Method,
    /// Path pattern; `{name}` captures the key name.
    pub pattern: &'static str,
    /// One-line help.
    pub synopsis: &'static str,
    /// Longer help.
    pub description: &'static str,
}

/// Route matched by [`RouteTable::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    /// The matched route.
    pub route: &'a Route,
    /// Captured key name.
    pub name: String,
}

const KEY_CONFIG_SYNOPSIS: &str = "Configure a named encryption key";

const KEY_CONFIG_DESCRIPTION: &str = "\
Adjusts the configuration of a named key. min_decryption_version sets the \
oldest key version still accepted for decryption and may not exceed the \
latest version; 0 is treated as 1. deletion_allowed controls whether the key \
may later be deleted.";

/// Ordered routing table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The transit engine's routes.
    pub fn transit() -> Self {
        Self::new()
            .with_route(Route {
                operation: "TransitUpdateKeyConfig",
                method: Method::Update,
                pattern: "keys/{name}/config",
                synopsis: KEY_CONFIG_SYNOPSIS,
                description: KEY_CONFIG_DESCRIPTION,
            })
            .with_route(Route {
                operation: "TransitReadKeyConfig",
                method: Method::Read,
                pattern: "keys/{name}/config",
                synopsis: KEY_CONFIG_SYNOPSIS,
                description: KEY_CONFIG_DESCRIPTION,
            })
    }

    /// Append a route.
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Operation names handled by this table.
    pub fn handles(&self) -> Vec<&'static str> {
        self.routes.iter().map(|r| r.operation).collect()
    }

    /// Find a route by operation name.
    pub fn route_for(&self, operation: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.operation == operation)
    }

    /// Match a method and path against the table.
    ///
    /// Leading and trailing slashes are ignored. The captured name is not
    /// validated here; the store applies the key name rules.
    pub fn resolve(&self, method: Method, path: &str) -> Option<ResolvedRoute<'_>> {
        let path = path.trim_matches('/');
        self.routes
            .iter()
            .filter(|r| r.method == method)
            .find_map(|route| match_pattern(route.pattern, path).map(|name| ResolvedRoute { route, name }))
    }
}

/// Match `path` against `pattern`, returning the `{name}` capture.
fn match_pattern(pattern: &str, path: &str) -> Option<String> {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    let mut name = None;

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return name,
            (Some("{name}"), Some(segment)) if !segment.is_empty() => name = Some(segment.to_string()),
            (Some(expected), Some(segment)) if expected == segment => {}
            _ => return None,
        }
    }
}
