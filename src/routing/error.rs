//! Routing error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A problem found while building the route table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("route pattern `{pattern}` declares parameter `{param}` twice")]
    DuplicateParameter { pattern: String, param: String },

    #[error("invalid constraint for parameter `{param}`: {reason}")]
    InvalidConstraint { param: String, reason: String },

    #[error("route `{uri}` constrains unknown parameter `{param}`")]
    UnknownParameter { uri: String, param: String },

    #[error("route `{uri}` references unknown action `{action}`")]
    UnknownAction { uri: String, action: String },

    #[error("route `{uri}` references unknown middleware `{middleware}`")]
    UnknownMiddleware { uri: String, middleware: String },

    #[error("route name `{0}` is registered more than once")]
    DuplicateName(String),

    #[error("route `{0}` uses an inline handler and cannot be cached")]
    Uncacheable(String),

    #[error("route cache {path}: {reason}")]
    Cache { path: PathBuf, reason: String },
}

/// Every problem found by one `RouterBuilder::build` call.
#[derive(Debug, PartialEq, Eq)]
pub struct RouteErrors(pub Vec<RouteError>);

impl RouteErrors {
    pub fn iter(&self) -> impl Iterator<Item = &RouteError> {
        self.0.iter()
    }
}

impl fmt::Display for RouteErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route table is invalid: ")?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for RouteErrors {}

/// Failure to generate a URL for a named route.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("route [{0}] not defined")]
    RouteNotFound(String),

    #[error("missing required parameter `{param}` for route [{route}]")]
    MissingParameter { route: String, param: String },

    #[error("parameter `{param}` for route [{route}] does not match `{constraint}`")]
    InvalidParameter {
        route: String,
        param: String,
        constraint: String,
    },
}
