//! Route table and dispatch.

use std::collections::HashMap;

use crate::http::request::Method;
use crate::pipeline::Handler;
use crate::router::pattern::PathPattern;

/// A registered route: verb, pattern and its ordered handler chain.
///
/// Immutable after registration. Several routes may share a method+pattern
/// shape; the table is scanned in registration order and the first
/// structural match wins.
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub handlers: Vec<Handler>,
}

/// A successful dispatch: the matched route plus its bound parameters.
/// The request's query and hash already live on the request context.
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// Ordered sequence of registered routes.
///
/// Appended to at setup time, read-only during request processing. Dispatch
/// is a linear scan — O(routes × segments) per request, fine for the small
/// static tables this engine serves.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Scans the table in registration order and returns the first route
    /// whose method and pattern both match.
    ///
    /// The method must match exactly before segment comparison is attempted.
    pub fn dispatch(&self, method: &Method, pathname: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            if route.method != *method {
                return None;
            }
            route
                .pattern
                .match_path(pathname)
                .map(|params| RouteMatch { route, params })
        })
    }
}
