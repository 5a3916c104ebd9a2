//! Request kernel.
//!
//! # Data Flow
//! ```text
//! Request (parsed, sanitized)
//!     → flash store (pending messages)
//!     → Router::dispatch (middleware → action)
//!     → view responses rendered by a request-scoped ViewFactory
//!     → ErrorHandler for errors and panics
//!     → flash store (persist new messages)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Synchronous: one request runs start to finish on one thread
//! - Everything shared is immutable; everything mutable is per request
//! - A panic anywhere in dispatch or rendering becomes a 500, never a
//!   dropped connection

pub mod boot;
pub mod errors;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::http::{Body, HandlerResult, HttpError, Request, RequestContext, Response};
use crate::observability::logging::panic_message;
use crate::observability::metrics;
use crate::routing::{Router, UrlGenerator};
use crate::support::{FlashBag, FlashStore};
use crate::views::ViewFactory;

pub use boot::{BootError, KernelBuilder};
pub use errors::ErrorHandler;

/// Handles requests for one booted application.
pub struct Kernel {
    router: Arc<Router>,
    urls: Arc<dyn UrlGenerator>,
    views: ViewFactory,
    errors: ErrorHandler,
    flash: Arc<dyn FlashStore>,
}

impl Kernel {
    pub(crate) fn new(
        router: Arc<Router>,
        views: ViewFactory,
        errors: ErrorHandler,
        flash: Arc<dyn FlashStore>,
    ) -> Self {
        let urls: Arc<dyn UrlGenerator> = router.clone();
        Self {
            router,
            urls,
            views,
            errors,
            flash,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The application-wide view factory.
    pub fn views(&self) -> &ViewFactory {
        &self.views
    }

    /// Handle one request to completion.
    pub fn handle(&self, request: Request) -> Response {
        let started = Instant::now();
        let method = request.method().clone();
        let path = request.path().to_string();
        let wants_json = request.wants_json();

        let incoming = self.flash.load(&request);
        let mut cx = RequestContext::new(request)
            .with_flash(FlashBag::with_incoming(incoming))
            .with_urls(Arc::clone(&self.urls));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            match self.dispatch(&mut cx) {
                Ok(response) => response,
                Err(err) => self.errors.handle(&err, wants_json),
            }
        }));
        let mut response = outcome.unwrap_or_else(|payload| {
            self.errors.handle_panic(&panic_message(payload.as_ref()), wants_json)
        });

        self.flash.persist(&cx.take_flash(), &mut response);

        let status = response.status();
        let elapsed = started.elapsed();
        metrics::record_request(method.as_str(), cx.route_name(), status.as_u16(), elapsed);
        tracing::info!(
            method = %method,
            path = %path,
            route = cx.route_name().unwrap_or("-"),
            status = status.as_u16(),
            duration_ms = elapsed.as_millis() as u64,
            "Request handled"
        );
        response
    }

    /// Response for a request rejected before it reached the router.
    pub fn reject(&self, err: &HttpError, wants_json: bool) -> Response {
        self.errors.handle(err, wants_json)
    }

    fn dispatch(&self, cx: &mut RequestContext) -> HandlerResult {
        let response = self.router.dispatch(cx)?;
        self.render(cx, response)
    }

    /// Render a view body into HTML, keeping status and headers.
    fn render(&self, cx: &mut RequestContext, mut response: Response) -> HandlerResult {
        let Some(spec) = response.view_spec().cloned() else {
            return Ok(response);
        };

        let mut views = self.views.clone();
        views.share_many(cx.take_shared());
        views.share("flash", flash_value(cx.flash()));
        if let Some(name) = cx.route_name() {
            views.share("current_route", Value::String(name.to_string()));
        }

        let html = views
            .make(&spec.name, &spec.data, &spec.layout)
            .map_err(HttpError::View)?;
        response.set_body(Body::Html(html));
        Ok(response)
    }
}

fn flash_value(bag: &FlashBag) -> Value {
    serde_json::to_value(bag.incoming()).unwrap_or(Value::Array(Vec::new()))
}
