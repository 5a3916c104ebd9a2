//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, limits, timeout)
//!     → request.rs (parse query + body, sanitize, method override)
//!     → kernel (routing, controllers, views)
//!     → response.rs (status, headers, rendered body)
//!     → Send to client
//! ```

pub mod context;
pub mod error;
pub mod request;
pub mod response;
pub mod server;
pub mod validation;

pub use context::RequestContext;
pub use error::{HandlerResult, HttpError};
pub use request::{sanitize, Request};
pub use response::{Body, Response, ViewSpec};
pub use server::{AppState, HttpServer, X_REQUEST_ID};
pub use validation::{ValidationErrors, Validator};
