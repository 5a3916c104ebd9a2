//! Response handling.
//!
//! # Responsibilities
//! - Represent what an action returns: view, HTML, text, JSON or redirect
//! - Carry status and headers so middleware can decorate any response
//! - Convert to an axum response once views have been rendered
//!
//! # Design Decisions
//! - View bodies stay unrendered until the kernel renders them, so the
//!   view name and data remain inspectable by middleware and tests
//! - An unrendered view reaching the wire is a bug and becomes a 500

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::Value;

use crate::views::{view_data, Layout, ViewData};

/// A view waiting to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSpec {
    pub name: String,
    pub data: ViewData,
    pub layout: Layout,
}

/// Response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Text(String),
    Html(String),
    Json(Value),
    View(ViewSpec),
}

/// What an action or middleware hands back to the kernel.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    pub fn new(status: StatusCode, body: Body) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// A view rendered with the default layout.
    ///
    /// `data` should be a JSON object; `null` means no data and any other
    /// value is exposed under the `data` key.
    pub fn view(name: impl Into<String>, data: Value) -> Self {
        Self::new(
            StatusCode::OK,
            Body::View(ViewSpec {
                name: name.into(),
                data: view_data(data),
                layout: Layout::Default,
            }),
        )
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, Body::Html(content.into()))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, Body::Text(content.into()))
    }

    pub fn json(value: Value) -> Self {
        Self::new(StatusCode::OK, Body::Json(value))
    }

    /// 302 redirect to `location`.
    pub fn redirect(location: impl AsRef<str>) -> Self {
        let mut response = Self::new(StatusCode::FOUND, Body::Empty);
        match HeaderValue::from_str(location.as_ref()) {
            Ok(value) => {
                response.headers.insert(header::LOCATION, value);
            }
            Err(_) => {
                tracing::warn!(location = %location.as_ref(), "Invalid redirect location, redirecting to /");
                response
                    .headers
                    .insert(header::LOCATION, HeaderValue::from_static("/"));
            }
        }
        response
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Choose the layout of a view response. No effect on other bodies.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        if let Body::View(spec) = &mut self.body {
            spec.layout = layout;
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// The pending view, if this is an unrendered view response.
    pub fn view_spec(&self) -> Option<&ViewSpec> {
        match &self.body {
            Body::View(spec) => Some(spec),
            _ => None,
        }
    }

    /// Text of a rendered body (HTML or plain text).
    pub fn body_text(&self) -> Option<&str> {
        match &self.body {
            Body::Html(s) | Body::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let (content_type, bytes): (Option<&'static str>, Vec<u8>) = match self.body {
            Body::Empty => (None, Vec::new()),
            Body::Text(text) => (Some("text/plain; charset=utf-8"), text.into_bytes()),
            Body::Html(html) => (Some("text/html; charset=utf-8"), html.into_bytes()),
            Body::Json(value) => match serde_json::to_vec(&value) {
                Ok(bytes) => (Some("application/json"), bytes),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize JSON response");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            },
            Body::View(spec) => {
                tracing::error!(view = %spec.name, "Unrendered view reached the response writer");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let mut response = (self.status, bytes).into_response();
        let headers = response.headers_mut();
        match content_type {
            Some(content_type) => {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            None => {
                headers.remove(header::CONTENT_TYPE);
            }
        }
        for (name, value) in self.headers.iter() {
            headers.append(name.clone(), value.clone());
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_view_response_keeps_data() {
        let response = Response::view("contact", json!({"success": "1"}));
        let spec = response.view_spec().unwrap();
        assert_eq!(spec.name, "contact");
        assert_eq!(spec.data.get("success"), Some(&json!("1")));
        assert_eq!(spec.layout, Layout::Default);
    }

    #[test]
    fn test_non_object_view_data() {
        let response = Response::view("list", json!([1, 2]));
        assert_eq!(response.view_spec().unwrap().data.get("data"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_redirect() {
        let response = Response::redirect("/contact?success=1");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/contact?success=1");
    }

    #[test]
    fn test_into_response_sets_content_type() {
        let response = Response::html("<p>hi</p>").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_unrendered_view_is_server_error() {
        let response = Response::view("home", Value::Null).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
