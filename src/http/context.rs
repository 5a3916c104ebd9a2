//! Per-request state threaded through middleware and actions.

use std::sync::Arc;

use axum::http::Extensions;
use serde_json::Value;

use crate::http::request::Request;
use crate::routing::{RouteParams, UrlError, UrlGenerator};
use crate::support::flash::FlashBag;
use crate::views::ViewData;

/// Everything one request owns while it is being handled.
///
/// Nothing in here outlives the request, which keeps shared view data and
/// flash messages from leaking between requests.
pub struct RequestContext {
    request: Request,
    params: RouteParams,
    route_name: Option<String>,
    shared: ViewData,
    flash: FlashBag,
    urls: Option<Arc<dyn UrlGenerator>>,
    extensions: Extensions,
}

impl RequestContext {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            params: RouteParams::default(),
            route_name: None,
            shared: ViewData::new(),
            flash: FlashBag::default(),
            urls: None,
            extensions: Extensions::new(),
        }
    }

    pub fn with_flash(mut self, flash: FlashBag) -> Self {
        self.flash = flash;
        self
    }

    pub fn with_urls(mut self, urls: Arc<dyn UrlGenerator>) -> Self {
        self.urls = Some(urls);
        self
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Parameters captured by the matched route.
    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// Named route parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    pub(crate) fn set_route(&mut self, params: RouteParams, name: Option<String>) {
        self.params = params;
        self.route_name = name;
    }

    /// Share a value with the view rendered for this request.
    pub fn share(&mut self, key: impl Into<String>, value: Value) {
        self.shared.insert(key.into(), value);
    }

    pub fn shared(&self) -> &ViewData {
        &self.shared
    }

    pub(crate) fn take_shared(&mut self) -> ViewData {
        std::mem::take(&mut self.shared)
    }

    pub fn flash(&mut self) -> &mut FlashBag {
        &mut self.flash
    }

    pub(crate) fn take_flash(&mut self) -> FlashBag {
        std::mem::take(&mut self.flash)
    }

    /// Typed values attached by middleware.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// URL of a named route.
    pub fn route_url<I, K, V>(&self, name: &str, params: I) -> Result<String, UrlError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let urls = self
            .urls
            .as_ref()
            .ok_or_else(|| UrlError::RouteNotFound(name.to_string()))?;
        let params: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();
        urls.route_url(name, &params, false)
    }
}
