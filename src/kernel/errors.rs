//! Last line of defense: turns every failure into a response.
//!
//! # Responsibilities
//! - Map `HttpError`s and panics to status codes and pages
//! - Log unexpected failures with their full source chain
//! - Render diagnostics in debug mode, opaque pages in production
//!
//! # Design Decisions
//! - 404/405/422/400 are expected outcomes: logged at debug, never as errors
//! - Error views are optional; missing or broken ones fall back to plain HTML
//! - The same report text feeds the CLI and the debug page

use std::error::Error;
use std::fmt::Write as _;
use std::fs;

use axum::http::{header, HeaderValue, StatusCode};
use handlebars::html_escape;
use serde_json::{json, Value};

use crate::http::{HttpError, Response};
use crate::views::{view_data, Layout, ViewError, ViewFactory};

/// Lines shown on each side of a failing template line.
const SNIPPET_CONTEXT: usize = 3;

pub struct ErrorHandler {
    views: ViewFactory,
    debug: bool,
}

impl ErrorHandler {
    pub fn new(views: ViewFactory, debug: bool) -> Self {
        Self { views, debug }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn handle(&self, err: &HttpError, wants_json: bool) -> Response {
        let status = err.status();

        if err.is_expected() {
            tracing::debug!(status = status.as_u16(), error = %err, "Request rejected");
        } else {
            tracing::error!(status = status.as_u16(), error = %report(err), "Request failed");
        }

        let mut response = match err {
            HttpError::Validation(errors) => Response::json(json!({
                "message": "The given data was invalid.",
                "errors": errors,
            }))
            .with_status(status),
            _ if wants_json => self.json_error(err, status),
            HttpError::RouteNotFound { method, path } => self.error_page(
                "errors.404",
                status,
                json!({"method": method.as_str(), "path": path}),
                "The page you are looking for could not be found.",
            ),
            HttpError::MethodNotAllowed { method, path, allowed } => self.error_page(
                "errors.405",
                status,
                json!({
                    "method": method.as_str(),
                    "path": path,
                    "allowed": allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>(),
                }),
                "This address does not accept that request method.",
            ),
            HttpError::BadRequest(message) => plain_page(status, &html_escape(message)),
            _ if self.debug => Response::html(debug_page(err)).with_status(status),
            _ => plain_page(status, "Something went wrong on our end."),
        };

        if let Some(allow) = err.allow_header() {
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }
        response
    }

    /// Response for a panic caught while handling a request.
    pub fn handle_panic(&self, message: &str, wants_json: bool) -> Response {
        tracing::error!(panic = %message, "Request handler panicked");
        let status = StatusCode::INTERNAL_SERVER_ERROR;

        if wants_json {
            let mut body = json!({"message": "Server Error"});
            if self.debug {
                body["panic"] = Value::String(message.to_string());
            }
            return Response::json(body).with_status(status);
        }

        if self.debug {
            let body = format!(
                "<!doctype html><html><head><title>Panic</title></head><body>\
                 <h1>Request handler panicked</h1><pre>{}</pre></body></html>",
                html_escape(message)
            );
            Response::html(body).with_status(status)
        } else {
            plain_page(status, "Something went wrong on our end.")
        }
    }

    fn json_error(&self, err: &HttpError, status: StatusCode) -> Response {
        let message = if err.is_expected() {
            err.to_string()
        } else {
            status.canonical_reason().unwrap_or("Server Error").to_string()
        };
        let mut body = json!({ "message": message });
        if self.debug && !err.is_expected() {
            body["error"] = Value::String(report(err));
        }
        Response::json(body).with_status(status)
    }

    fn error_page(&self, view: &str, status: StatusCode, data: Value, fallback: &str) -> Response {
        if self.views.finder().exists(view) {
            match self.views.make(view, &view_data(data), &Layout::Default) {
                Ok(html) => return Response::html(html).with_status(status),
                Err(e) => tracing::error!(view, error = %report(&e), "Error view failed to render"),
            }
        }
        plain_page(status, fallback)
    }
}

fn plain_page(status: StatusCode, message: &str) -> Response {
    let title = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let body = format!(
        "<!doctype html><html><head><title>{title}</title></head>\
         <body><h1>{title}</h1><p>{message}</p></body></html>"
    );
    Response::html(body).with_status(status)
}

/// The error and its source chain, one cause per line.
pub fn report(err: &(dyn Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\n  caused by: {cause}");
        source = cause.source();
    }
    out
}

fn view_error(err: &HttpError) -> Option<&ViewError> {
    match err {
        HttpError::View(e) => Some(e),
        _ => None,
    }
}

/// Lines around `line` (1-based) of `path`, the failing one marked.
pub fn source_snippet(path: &str, line: usize) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let lines: Vec<&str> = text.lines().collect();
    if line == 0 || line > lines.len() {
        return None;
    }

    let first = line.saturating_sub(SNIPPET_CONTEXT).max(1);
    let last = (line + SNIPPET_CONTEXT).min(lines.len());
    let mut out = String::new();
    for n in first..=last {
        let marker = if n == line { ">" } else { " " };
        let _ = writeln!(out, "{marker} {n:>4} | {}", lines[n - 1]);
    }
    Some(out)
}

fn debug_page(err: &HttpError) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<!doctype html><html><head><title>Error</title></head><body>\
         <h1>{}</h1><pre>{}</pre>",
        html_escape(&err.to_string()),
        html_escape(&report(err))
    );

    if let Some((template, Some(line))) = view_error(err).and_then(ViewError::location) {
        if let Some(snippet) = source_snippet(template, line) {
            let _ = write!(
                body,
                "<h2>{}:{}</h2><pre>{}</pre>",
                html_escape(template),
                line,
                html_escape(&snippet)
            );
        }
    }

    body.push_str("</body></html>");
    body
}
