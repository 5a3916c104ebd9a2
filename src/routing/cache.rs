//! Route table cache.
//!
//! The cache stores route definitions only. Actions and middleware are
//! re-resolved against the registries when the router is built, so a stale
//! cache fails at boot like any other bad route.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::routing::action::Action;
use crate::routing::collection::RouteCollection;
use crate::routing::error::RouteError;
use crate::routing::route::Route;

/// Serialized form of one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub methods: Vec<String>,
    pub uri: String,
    pub action: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub wheres: Vec<(String, String)>,
    #[serde(default)]
    pub middleware: Vec<String>,
}

impl RouteRecord {
    fn from_route(route: &Route) -> Result<Self, RouteError> {
        let action = match route.action() {
            Action::Controller(id) => id.clone(),
            Action::Handler(_) => return Err(RouteError::Uncacheable(route.uri().to_string())),
        };
        Ok(Self {
            methods: route.methods().iter().map(|m| m.as_str().to_string()).collect(),
            uri: route.uri().to_string(),
            action,
            name: route.route_name().map(str::to_string),
            wheres: route.wheres().to_vec(),
            middleware: route.middleware_ids().to_vec(),
        })
    }

    fn into_route(self, path: &Path) -> Result<Route, RouteError> {
        let methods = self
            .methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.as_bytes()).map_err(|_| RouteError::Cache {
                    path: path.to_path_buf(),
                    reason: format!("invalid method `{m}` for `{}`", self.uri),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Route::from_cached(
            methods,
            self.uri,
            Action::Controller(self.action),
            self.name,
            self.wheres,
            self.middleware,
        ))
    }
}

/// Write the route table to `path` as JSON. Returns the number of routes.
pub fn write_cache(path: &Path, routes: &RouteCollection) -> Result<usize, RouteError> {
    let records = routes
        .iter()
        .map(|r| RouteRecord::from_route(r.definition()))
        .collect::<Result<Vec<_>, _>>()?;

    let cache_error = |reason: String| RouteError::Cache {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| cache_error(e.to_string()))?;
    }
    let file = File::create(path).map_err(|e| cache_error(e.to_string()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &records)
        .map_err(|e| cache_error(e.to_string()))?;

    tracing::info!(path = %path.display(), routes = records.len(), "Route cache written");
    Ok(records.len())
}

/// Read routes back from a cache file.
pub fn read_cache(path: &Path) -> Result<Vec<Route>, RouteError> {
    let cache_error = |reason: String| RouteError::Cache {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| cache_error(e.to_string()))?;
    let records: Vec<RouteRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| cache_error(e.to_string()))?;

    records.into_iter().map(|r| r.into_route(path)).collect()
}
