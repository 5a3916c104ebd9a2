//! Compiled route table.
//!
//! # Design Decisions
//! - Registration order is match order; first match wins
//! - O(n) scan over routes (acceptable for typical route counts)
//! - Name index built once at compile time

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::action::Handler;
use crate::routing::middleware::Middleware;
use crate::routing::pattern::{Constraint, RouteParams, RoutePattern};
use crate::routing::route::Route;

/// A route ready for dispatch: pattern parsed, action and middleware resolved.
pub struct CompiledRoute {
    pub(crate) route: Route,
    pub(crate) pattern: RoutePattern,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) handler: Handler,
    /// Global middleware followed by group and route middleware.
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
}

impl CompiledRoute {
    /// The definition this route was compiled from.
    pub fn definition(&self) -> &Route {
        &self.route
    }

    pub fn uri(&self) -> &str {
        self.route.uri()
    }

    pub fn name(&self) -> Option<&str> {
        self.route.route_name()
    }

    pub fn methods(&self) -> &[Method] {
        self.route.methods()
    }

    /// HEAD requests are served by GET routes.
    pub fn allows(&self, method: &Method) -> bool {
        let methods = self.route.methods();
        methods.contains(method) || (*method == Method::HEAD && methods.contains(&Method::GET))
    }

    pub fn matches(&self, segments: &[&str]) -> Option<RouteParams> {
        self.pattern.matches(segments, &self.constraints)
    }
}

/// Outcome of looking a request up in the collection.
pub enum RouteMatch<'r> {
    Found(&'r CompiledRoute, RouteParams),
    /// The path matched, but only for these methods.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Ordered routes plus the name index.
#[derive(Default)]
pub struct RouteCollection {
    routes: Vec<CompiledRoute>,
    names: HashMap<String, usize>,
}

impl RouteCollection {
    /// Add a compiled route. Returns false if its name is already taken,
    /// in which case the route is not added.
    pub(crate) fn push(&mut self, route: CompiledRoute) -> bool {
        if let Some(name) = route.name() {
            if self.names.contains_key(name) {
                return false;
            }
            self.names.insert(name.to_string(), self.routes.len());
        }
        self.routes.push(route);
        true
    }

    pub fn find<'r>(&'r self, method: &Method, segments: &[&str]) -> RouteMatch<'r> {
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.matches(segments) else {
                continue;
            };
            if route.allows(method) {
                return RouteMatch::Found(route, params);
            }
            for m in route.methods() {
                if !allowed.contains(m) {
                    allowed.push(m.clone());
                }
            }
        }

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed(allowed)
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&CompiledRoute> {
        self.names.get(name).and_then(|&index| self.routes.get(index))
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
