//! Application middleware.

use std::sync::Arc;

use axum::http::header::{self, HeaderName};
use axum::http::HeaderValue;

use crate::routing::{from_fn, Middleware};

/// Conservative browser security headers on every routed response.
pub fn security_headers() -> Arc<dyn Middleware> {
    from_fn(|cx, next| {
        let mut response = next.run(cx)?;
        let headers = response.headers_mut();
        headers
            .entry(header::X_CONTENT_TYPE_OPTIONS)
            .or_insert(HeaderValue::from_static("nosniff"));
        headers
            .entry(header::X_FRAME_OPTIONS)
            .or_insert(HeaderValue::from_static("SAMEORIGIN"));
        headers
            .entry(HeaderName::from_static("referrer-policy"))
            .or_insert(HeaderValue::from_static("strict-origin-when-cross-origin"));
        Ok(response)
    })
}

/// Keep form pages out of shared caches.
pub fn no_store() -> Arc<dyn Middleware> {
    from_fn(|cx, next| {
        let mut response = next.run(cx)?;
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        Ok(response)
    })
}
