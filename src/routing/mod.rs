//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at boot):
//!     RouterBuilder::get/post/.../group
//!     → route.rs (definitions, group attributes merged)
//!     → router.rs build(): parse patterns, resolve actions + middleware
//!     → collection.rs (ordered table + name index), frozen as Router
//!
//! Incoming Request (method, path)
//!     → collection.rs find (first match wins)
//!     → middleware.rs chain (global → group → route)
//!     → action.rs handler
//!     → Return: Response, or RouteNotFound / MethodNotAllowed
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: registration order decides ties
//! - Build reports every invalid route, not just the first
//! - `{param}` constraints are anchored regexes, checked only after the
//!   segment shape matches

pub mod action;
pub mod cache;
pub mod collection;
pub mod error;
pub mod middleware;
pub mod pattern;
pub mod route;
pub mod router;
pub mod url;

pub use action::{Action, ActionRegistry, ControllerActions, Handler};
pub use collection::{CompiledRoute, RouteCollection, RouteMatch};
pub use error::{RouteError, RouteErrors, UrlError};
pub use middleware::{from_fn, Middleware, Next};
pub use pattern::{RouteParams, RoutePattern};
pub use route::{GroupAttributes, Route};
pub use router::{Router, RouterBuilder};
pub use url::UrlGenerator;
