//! Route actions and the controller action registry.
//!
//! A route's action is either an inline handler or a `Controller@method`
//! identifier. Identifiers are resolved against the [`ActionRegistry`] when
//! the router is built, so a typo fails at boot instead of at request time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::{HandlerResult, RequestContext};

/// The final link of a middleware chain.
pub type Handler = Arc<dyn Fn(&mut RequestContext) -> HandlerResult + Send + Sync>;

/// What a route runs once matched.
#[derive(Clone)]
pub enum Action {
    /// `Controller@method`, resolved through the registry.
    Controller(String),
    /// A closure registered directly on the route.
    Handler(Handler),
}

impl Action {
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        Action::Handler(Arc::new(f))
    }

    /// The identifier shown in route listings.
    pub fn describe(&self) -> &str {
        match self {
            Action::Controller(id) => id,
            Action::Handler(_) => "Closure",
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Controller(id) => f.debug_tuple("Controller").field(id).finish(),
            Action::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl From<&str> for Action {
    fn from(id: &str) -> Self {
        Action::Controller(id.to_string())
    }
}

impl From<String> for Action {
    fn from(id: String) -> Self {
        Action::Controller(id)
    }
}

/// Maps `Controller@method` identifiers to handlers.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Handler>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single action under `id`.
    pub fn action<F>(&mut self, id: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.actions.insert(id.into(), Arc::new(f));
        self
    }

    /// Start registering the methods of a controller.
    ///
    /// `factory` builds a controller instance per invocation.
    pub fn controller<C, F>(&mut self, name: &str, factory: F) -> ControllerActions<'_, C>
    where
        C: 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        ControllerActions {
            registry: self,
            name: name.to_string(),
            factory: Arc::new(factory),
        }
    }

    pub fn get(&self, id: &str) -> Option<Handler> {
        self.actions.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Builder returned by [`ActionRegistry::controller`].
pub struct ControllerActions<'a, C> {
    registry: &'a mut ActionRegistry,
    name: String,
    factory: Arc<dyn Fn() -> C + Send + Sync>,
}

impl<'a, C: 'static> ControllerActions<'a, C> {
    /// Register `Controller@method`, dispatching to `method` on a fresh instance.
    pub fn method<M>(self, method: &str, m: M) -> Self
    where
        M: Fn(&C, &mut RequestContext) -> HandlerResult + Send + Sync + 'static,
    {
        let factory = Arc::clone(&self.factory);
        let id = format!("{}@{}", self.name, method);
        self.registry
            .actions
            .insert(id, Arc::new(move |cx: &mut RequestContext| m(&factory(), cx)));
        self
    }
}
