//! Request snapshot handed to middleware and controllers.
//!
//! # Responsibilities
//! - Parse query string and body parameters (urlencoded forms, JSON objects)
//! - Sanitize every parameter value before anything observes it
//! - Apply the `_method` form override for PUT/PATCH/DELETE
//!
//! # Design Decisions
//! - Immutable after construction; sanitization never happens later
//! - Percent-encoded path is kept as received, the router decodes segments
//! - Last occurrence of a repeated key wins

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Method};
use url::form_urlencoded;

use crate::http::error::HttpError;

/// Form field used by HTML forms to tunnel PUT/PATCH/DELETE through POST.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// A fully parsed, sanitized HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: BTreeMap<String, String>,
    body_params: BTreeMap<String, String>,
    headers: HeaderMap,
    raw_body: Bytes,
}

impl Request {
    /// Create a bodiless request from a method and a URI (`/path?query`).
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = split_uri(uri);
        Self {
            method,
            path,
            query: parse_urlencoded(query.as_bytes()),
            body_params: BTreeMap::new(),
            headers: HeaderMap::new(),
            raw_body: Bytes::new(),
        }
    }

    /// Shorthand for `Request::new(Method::GET, uri)`.
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Build a POST request carrying an urlencoded form.
    pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Self {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let (path, query) = split_uri(uri);
        Self::assemble(Method::POST, path, &query, headers, Bytes::from(body))
            .unwrap_or_else(|_| Self::new(Method::POST, uri))
    }

    /// Build a request from the parts of an incoming HTTP request.
    pub fn from_parts(parts: &Parts, body: Bytes) -> Result<Self, HttpError> {
        let path = parts.uri.path().to_string();
        let query = parts.uri.query().unwrap_or_default().to_string();
        Self::assemble(parts.method.clone(), path, &query, parts.headers.clone(), body)
    }

    fn assemble(
        method: Method,
        path: String,
        query: &str,
        headers: HeaderMap,
        raw_body: Bytes,
    ) -> Result<Self, HttpError> {
        let body_params = parse_body(&headers, &raw_body)?;
        let method = override_method(method, &body_params);

        Ok(Self {
            method,
            path,
            query: parse_urlencoded(query.as_bytes()),
            body_params,
            headers,
            raw_body,
        })
    }

    /// Attach a header. Intended for building requests by hand.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string parameter.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Body parameter.
    pub fn post(&self, key: &str) -> Option<&str> {
        self.body_params.get(key).map(String::as_str)
    }

    pub fn body_params(&self) -> &BTreeMap<String, String> {
        &self.body_params
    }

    /// Body parameter, falling back to the query string.
    pub fn input(&self, key: &str) -> Option<&str> {
        self.post(key).or_else(|| self.query(key))
    }

    /// Query and body parameters merged, body winning.
    pub fn all(&self) -> BTreeMap<String, String> {
        let mut all = self.query.clone();
        all.extend(self.body_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        all
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text, if present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// True when the client asked for JSON.
    pub fn wants_json(&self) -> bool {
        self.header("accept")
            .map(|accept| accept.contains("application/json"))
            .unwrap_or(false)
    }
}

fn split_uri(uri: &str) -> (String, String) {
    match uri.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (uri.to_string(), String::new()),
    }
}

fn parse_urlencoded(input: &[u8]) -> BTreeMap<String, String> {
    form_urlencoded::parse(input)
        .map(|(k, v)| (sanitize(&k), sanitize(&v)))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

fn parse_body(headers: &HeaderMap, body: &Bytes) -> Result<BTreeMap<String, String>, HttpError> {
    if body.is_empty() {
        return Ok(BTreeMap::new());
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        return Ok(parse_urlencoded(body));
    }

    if content_type.starts_with("application/json") {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| HttpError::BadRequest(format!("malformed JSON body: {e}")))?;
        return Ok(match value {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| {
                    let text = match v {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (sanitize(&k), sanitize(&text))
                })
                .collect(),
            _ => BTreeMap::new(),
        });
    }

    Ok(BTreeMap::new())
}

fn override_method(method: Method, body: &BTreeMap<String, String>) -> Method {
    if method != Method::POST {
        return method;
    }
    match body
        .get(METHOD_OVERRIDE_FIELD)
        .map(|m| m.to_ascii_uppercase())
        .as_deref()
    {
        Some("PUT") => Method::PUT,
        Some("PATCH") => Method::PATCH,
        Some("DELETE") => Method::DELETE,
        _ => method,
    }
}

/// Trim surrounding whitespace and drop control characters except tab/newlines.
pub fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing() {
        let req = Request::get("/contact?success=1&name=%20Ada%20");
        assert_eq!(req.path(), "/contact");
        assert_eq!(req.query("success"), Some("1"));
        assert_eq!(req.query("name"), Some("Ada"));
        assert_eq!(req.query("missing"), None);
    }

    #[test]
    fn test_form_body_is_sanitized() {
        let req = Request::post_form("/contact", &[("name", "  Ada\u{0000} "), ("note", "a\nb")]);
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.post("name"), Some("Ada"));
        assert_eq!(req.post("note"), Some("a\nb"));
    }

    #[test]
    fn test_method_override() {
        let req = Request::post_form("/items/1", &[("_method", "delete")]);
        assert_eq!(req.method(), &Method::DELETE);

        let req = Request::post_form("/items/1", &[("_method", "TRACE")]);
        assert_eq!(req.method(), &Method::POST);
    }

    #[test]
    fn test_json_body() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let body = Bytes::from_static(br#"{"name":"Ada","age":36,"tags":["x"]}"#);
        let req = Request::assemble(Method::POST, "/".into(), "", headers, body).unwrap();
        assert_eq!(req.post("name"), Some("Ada"));
        assert_eq!(req.post("age"), Some("36"));
        assert_eq!(req.post("tags"), Some(r#"["x"]"#));
    }

    #[test]
    fn test_malformed_json_is_bad_request() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let err = Request::assemble(Method::POST, "/".into(), "", headers, Bytes::from_static(b"{"))
            .unwrap_err();
        assert!(matches!(err, HttpError::BadRequest(_)));
    }

    #[test]
    fn test_input_prefers_body() {
        let req = Request::post_form("/search?q=query", &[("q", "body")]);
        assert_eq!(req.input("q"), Some("body"));
        assert_eq!(req.all().get("q").map(String::as_str), Some("body"));
    }
}
