//! Route registration, lookup and dispatch.
//!
//! # Responsibilities
//! - Register routes, groups, middleware aliases and global middleware
//! - Compile the table, reporting every problem at once
//! - Dispatch a request through its middleware chain to the action
//! - Generate URLs for named routes
//!
//! # Design Decisions
//! - Immutable after `build()` (thread-safe without locks)
//! - 404 vs 405 decided by re-using the same scan: a path that matches
//!   only under other methods is a 405 carrying those methods
//! - Explicit errors rather than silent defaults

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use axum::http::Method;
use url::form_urlencoded;

use crate::http::{HandlerResult, HttpError, RequestContext};
use crate::routing::action::{Action, ActionRegistry, Handler};
use crate::routing::cache;
use crate::routing::collection::{CompiledRoute, RouteCollection, RouteMatch};
use crate::routing::error::{RouteError, RouteErrors, UrlError};
use crate::routing::middleware::{Middleware, Next};
use crate::routing::pattern::{split_path, Constraint, RoutePattern};
use crate::routing::route::{GroupAttributes, Route};
use crate::routing::url::UrlGenerator;

/// Methods registered by [`RouterBuilder::any`].
const ANY_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Mutable registration phase of the router.
#[derive(Default)]
pub struct RouterBuilder {
    routes: Vec<Route>,
    groups: Vec<GroupAttributes>,
    actions: ActionRegistry,
    aliases: HashMap<String, Arc<dyn Middleware>>,
    global: Vec<Arc<dyn Middleware>>,
    base_url: String,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL used for absolute URLs, e.g. `https://example.com`.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Controller action registry.
    pub fn actions(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    /// Register middleware under an identifier usable in groups and routes.
    pub fn alias_middleware(&mut self, id: &str, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.aliases.insert(id.to_string(), middleware);
        self
    }

    /// Middleware wrapped around every matched route, outermost first.
    pub fn global_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.global.push(middleware);
        self
    }

    /// Register routes inside a group. Nested groups compose.
    pub fn group<F>(&mut self, attributes: GroupAttributes, callback: F)
    where
        F: FnOnce(&mut Self),
    {
        let merged = self.current_group().merge(&attributes);
        self.groups.push(merged);
        callback(self);
        self.groups.pop();
    }

    fn current_group(&self) -> GroupAttributes {
        self.groups.last().cloned().unwrap_or_default()
    }

    /// Register a route for an explicit method set.
    pub fn match_methods(
        &mut self,
        methods: &[Method],
        uri: &str,
        action: impl Into<Action>,
    ) -> &mut Route {
        let route = Route::new(methods.to_vec(), uri, action.into(), &self.current_group());
        let index = self.routes.len();
        self.routes.push(route);
        &mut self.routes[index]
    }

    pub fn get(&mut self, uri: &str, action: impl Into<Action>) -> &mut Route {
        self.match_methods(&[Method::GET], uri, action)
    }

    pub fn post(&mut self, uri: &str, action: impl Into<Action>) -> &mut Route {
        self.match_methods(&[Method::POST], uri, action)
    }

    pub fn put(&mut self, uri: &str, action: impl Into<Action>) -> &mut Route {
        self.match_methods(&[Method::PUT], uri, action)
    }

    pub fn patch(&mut self, uri: &str, action: impl Into<Action>) -> &mut Route {
        self.match_methods(&[Method::PATCH], uri, action)
    }

    pub fn delete(&mut self, uri: &str, action: impl Into<Action>) -> &mut Route {
        self.match_methods(&[Method::DELETE], uri, action)
    }

    pub fn any(&mut self, uri: &str, action: impl Into<Action>) -> &mut Route {
        self.match_methods(&ANY_METHODS, uri, action)
    }

    /// Register the routes stored in a cache file. Returns how many.
    pub fn load_cache(&mut self, path: &Path) -> Result<usize, RouteError> {
        let routes = cache::read_cache(path)?;
        let count = routes.len();
        self.routes.extend(routes);
        tracing::info!(path = %path.display(), routes = count, "Routes loaded from cache");
        Ok(count)
    }

    /// Compile the route table.
    pub fn build(self) -> Result<Router, RouteErrors> {
        let RouterBuilder {
            routes,
            actions,
            aliases,
            global,
            base_url,
            ..
        } = self;

        let mut errors = Vec::new();
        let mut collection = RouteCollection::default();
        let mut duplicate_names = HashSet::new();

        for route in routes {
            match compile_route(route, &actions, &aliases, &global) {
                Ok(compiled) => {
                    let name = compiled.name().map(str::to_string);
                    if !collection.push(compiled) {
                        if let Some(name) = name {
                            if duplicate_names.insert(name.clone()) {
                                errors.push(RouteError::DuplicateName(name));
                            }
                        }
                    }
                }
                Err(route_errors) => errors.extend(route_errors),
            }
        }

        if !errors.is_empty() {
            for err in &errors {
                tracing::error!(error = %err, "Invalid route");
            }
            return Err(RouteErrors(errors));
        }

        tracing::info!(routes = collection.len(), "Route table compiled");

        Ok(Router {
            routes: collection,
            base_url,
        })
    }
}

fn compile_route(
    route: Route,
    actions: &ActionRegistry,
    aliases: &HashMap<String, Arc<dyn Middleware>>,
    global: &[Arc<dyn Middleware>],
) -> Result<CompiledRoute, Vec<RouteError>> {
    let mut errors = Vec::new();

    let pattern = match RoutePattern::parse(route.uri()) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let mut constraints = Vec::new();
    for (param, regex) in route.wheres() {
        if let Some(pattern) = &pattern {
            if !pattern.has_param(param) {
                errors.push(RouteError::UnknownParameter {
                    uri: route.uri().to_string(),
                    param: param.clone(),
                });
                continue;
            }
        }
        match Constraint::new(param, regex) {
            Ok(constraint) => constraints.push(constraint),
            Err(e) => errors.push(e),
        }
    }

    let handler: Option<Handler> = match route.action() {
        Action::Handler(handler) => Some(Arc::clone(handler)),
        Action::Controller(id) => {
            let handler = actions.get(id);
            if handler.is_none() {
                errors.push(RouteError::UnknownAction {
                    uri: route.uri().to_string(),
                    action: id.clone(),
                });
            }
            handler
        }
    };

    let mut middleware: Vec<Arc<dyn Middleware>> = global.to_vec();
    for id in route.middleware_ids() {
        match aliases.get(id) {
            Some(m) => middleware.push(Arc::clone(m)),
            None => errors.push(RouteError::UnknownMiddleware {
                uri: route.uri().to_string(),
                middleware: id.clone(),
            }),
        }
    }

    match (pattern, handler) {
        (Some(pattern), Some(handler)) if errors.is_empty() => Ok(CompiledRoute {
            route,
            pattern,
            constraints,
            handler,
            middleware,
        }),
        _ => Err(errors),
    }
}

/// The compiled, immutable router.
pub struct Router {
    routes: RouteCollection,
    base_url: String,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    /// Match the request in `cx` and run the route's middleware chain.
    pub fn dispatch(&self, cx: &mut RequestContext) -> HandlerResult {
        let method = cx.request().method().clone();
        let path = cx.request().path().to_string();
        let segments = split_path(&path);

        match self.routes.find(&method, &segments) {
            RouteMatch::Found(route, params) => {
                tracing::debug!(
                    method = %method,
                    path = %path,
                    route = route.uri(),
                    name = route.name().unwrap_or("-"),
                    "Route matched"
                );
                cx.set_route(params, route.name().map(str::to_string));
                Next::new(&route.middleware, &route.handler).run(cx)
            }
            RouteMatch::MethodNotAllowed(allowed) => {
                tracing::debug!(method = %method, path = %path, allowed = ?allowed, "Method not allowed");
                Err(HttpError::MethodNotAllowed {
                    method,
                    path,
                    allowed,
                })
            }
            RouteMatch::NotFound => {
                tracing::debug!(method = %method, path = %path, "No route matched");
                Err(HttpError::RouteNotFound { method, path })
            }
        }
    }

    /// URL for a named route. Unused parameters become the query string.
    pub fn url<I, K, V>(&self, name: &str, params: I, absolute: bool) -> Result<String, UrlError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let params: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();
        self.route_url(name, &params, absolute)
    }

    /// Write the route table to a cache file.
    pub fn cache_routes(&self, path: &Path) -> Result<usize, RouteError> {
        cache::write_cache(path, &self.routes)
    }
}

impl UrlGenerator for Router {
    fn route_url(
        &self,
        name: &str,
        params: &[(String, String)],
        absolute: bool,
    ) -> Result<String, UrlError> {
        let route = self
            .routes
            .by_name(name)
            .ok_or_else(|| UrlError::RouteNotFound(name.to_string()))?;

        let (path, rest) = route.pattern.build(name, params, &route.constraints)?;

        let mut url = if absolute {
            format!("{}{}", self.base_url, path)
        } else {
            path
        };
        if !rest.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(rest.iter())
                .finish();
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    }
}
