//! Contact form.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use crate::http::{HandlerResult, HttpError, RequestContext, Response, Validator};
use crate::support::{ContactSubmission, ContactSubmissions};

pub const THANK_YOU: &str = "Thank you for your message. We'll be in touch soon.";

pub struct ContactController {
    submissions: Arc<dyn ContactSubmissions>,
}

impl ContactController {
    pub fn new(submissions: Arc<dyn ContactSubmissions>) -> Self {
        Self { submissions }
    }

    /// `GET /contact`
    pub fn index(&self, cx: &mut RequestContext) -> HandlerResult {
        let success = cx.request().query("success");
        Ok(Response::view(
            "contact",
            json!({ "title": "Contact", "success": success }),
        ))
    }

    /// `POST /contact`
    pub fn submit(&self, cx: &mut RequestContext) -> HandlerResult {
        let input = cx.request().body_params().clone();

        let validated = Validator::new(&input)
            .required("name")
            .max_length("name", 100)
            .required("email")
            .email("email")
            .max_length("email", 255)
            .required("message")
            .max_length("message", 5000)
            .finish();

        match validated {
            Ok(()) => {}
            // Browsers get the form back with errors and their input.
            Err(HttpError::Validation(errors)) if !cx.request().wants_json() => {
                tracing::debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Contact form rejected");
                return Ok(Response::view(
                    "contact",
                    json!({ "title": "Contact", "errors": errors, "old": input }),
                )
                .with_status(StatusCode::UNPROCESSABLE_ENTITY));
            }
            Err(e) => return Err(e),
        }

        let field = |name: &str| input.get(name).cloned().unwrap_or_default();
        let submission = ContactSubmission {
            name: field("name"),
            email: field("email"),
            message: field("message"),
        };
        self.submissions
            .submit(&submission)
            .map_err(|e| HttpError::Internal(e.to_string()))?;

        cx.flash().success(THANK_YOU);
        let url = cx.route_url("contact.index", [("success", 1)])?;
        Ok(Response::redirect(url))
    }
}
