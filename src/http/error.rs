//! Request-level error taxonomy.
//!
//! Routing misses and validation failures are expected outcomes; they are
//! turned into specific responses by the kernel's error handler. Everything
//! else surfaces as a 500.

use axum::http::{Method, StatusCode};
use thiserror::Error;

use crate::http::response::Response;
use crate::http::validation::ValidationErrors;
use crate::routing::UrlError;
use crate::views::ViewError;

/// Result type returned by actions and middleware.
pub type HandlerResult = Result<Response, HttpError>;

/// Errors raised while handling a request.
#[derive(Debug, Error)]
pub enum HttpError {
    /// No route pattern matches the request path.
    #[error("no route matches {method} {path}")]
    RouteNotFound { method: Method, path: String },

    /// A route matches the path but not the method.
    #[error("method {method} is not allowed for {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: Vec<Method>,
    },

    /// Input failed validation.
    #[error("the given data was invalid")]
    Validation(ValidationErrors),

    /// The request could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Url(#[from] UrlError),

    #[error("{0}")]
    Internal(String),
}

impl HttpError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            HttpError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            HttpError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::View(_) | HttpError::Url(_) | HttpError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Expected outcomes are not logged as application errors.
    pub fn is_expected(&self) -> bool {
        !self.status().is_server_error()
    }

    /// Value for the `Allow` header of a 405 response.
    pub fn allow_header(&self) -> Option<String> {
        match self {
            HttpError::MethodNotAllowed { allowed, .. } => Some(
                allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }
}
