//! End-to-end request handling through the kernel with the bundled app.

use axum::http::header::{self, HeaderValue};
use axum::http::{Method, StatusCode};
use trellis::app::contact::THANK_YOU;
use serde_json::json;
use trellis::http::{Body, Request, RequestContext};

mod common;

#[test]
fn test_home_page_renders_inside_layout() {
    let (kernel, _) = common::kernel();
    let response = kernel.handle(Request::get("/"));

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::html(&response);
    assert!(body.starts_with("<!doctype html>"));
    assert!(body.contains("<title>Home · Trellis</title>"));
    assert!(body.contains("Welcome to Trellis"));
    assert!(body.contains(r#"href="/contact""#));
    assert!(body.contains(r#"href="/assets/css/app.css""#));
    assert_eq!(response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
}

#[test]
fn test_contact_form() {
    let (kernel, _) = common::kernel();
    let response = kernel.handle(Request::get("/contact"));

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::html(&response);
    assert!(body.contains(r#"<form method="post" action="/contact">"#));
    assert!(body.contains(r#"aria-current="page""#));
    assert!(!body.contains("Your message has been sent."));
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");

    let response = kernel.handle(Request::get("/contact/?success=1"));
    assert!(common::html(&response).contains("Your message has been sent."));
}

#[test]
fn test_contact_index_passes_success_query_through() {
    let (kernel, _) = common::kernel();

    let mut cx = RequestContext::new(Request::get("/contact?success=1"));
    let response = kernel.router().dispatch(&mut cx).unwrap();
    let spec = response.view_spec().expect("contact view");
    assert_eq!(spec.name, "contact");
    assert_eq!(spec.data.get("success"), Some(&json!("1")));

    let mut cx = RequestContext::new(Request::get("/contact"));
    let response = kernel.router().dispatch(&mut cx).unwrap();
    assert_eq!(response.view_spec().unwrap().data.get("success"), Some(&json!(null)));
}

#[test]
fn test_invalid_submission_shows_errors_and_old_input() {
    let (kernel, submissions) = common::kernel();
    let response = kernel.handle(Request::post_form(
        "/contact",
        &[("name", "   "), ("email", "ada@"), ("message", "Hello <there>")],
    ));

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::html(&response);
    assert!(body.contains("The name field is required."));
    assert!(body.contains("The email must be a valid email address."));
    assert!(body.contains(r#"value="ada@""#));
    assert!(body.contains("Hello &lt;there&gt;"));
    assert_eq!(submissions.count(), 0);
}

#[test]
fn test_invalid_json_submission_is_422_json() {
    let (kernel, _) = common::kernel();
    let request = Request::post_form("/contact", &[("name", "Ada")])
        .with_header(header::ACCEPT, HeaderValue::from_static("application/json"));
    let response = kernel.handle(request);

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    match response.body() {
        Body::Json(body) => {
            assert!(body["errors"].get("name").is_none());
            assert_eq!(body["errors"]["email"][0], "The email field is required.");
            assert_eq!(body["errors"]["message"][0], "The message field is required.");
        }
        other => panic!("expected JSON, got {other:?}"),
    }
}

#[test]
fn test_valid_submission_redirects_with_flash() {
    let (kernel, submissions) = common::kernel();
    let response = kernel.handle(Request::post_form(
        "/contact",
        &[
            ("name", " Ada Lovelace "),
            ("email", "ada@example.com"),
            ("message", "Analytical engines"),
        ],
    ));

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/contact?success=1");
    {
        let received = submissions.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].name, "Ada Lovelace");
    }

    let cookie = common::cookie_pair(&response).expect("flash cookie");
    assert!(cookie.starts_with("trellis_flash="));

    let follow_up = kernel.handle(common::with_cookie(Request::get("/contact?success=1"), &cookie));
    assert_eq!(follow_up.status(), StatusCode::OK);
    let body = common::html(&follow_up);
    assert!(body.contains(r#"class="flash flash-success""#));
    assert!(body.contains(&THANK_YOU[..28]));

    // Shown once, then cleared.
    let cleared = follow_up.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));
}

#[test]
fn test_not_found_renders_error_view() {
    let (kernel, _) = common::kernel();
    let response = kernel.handle(Request::get("/nowhere"));

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = common::html(&response);
    assert!(body.contains("Page not found"));
    assert!(body.contains("Nothing lives at /nowhere."));
    assert!(body.contains("<title>Trellis</title>"));
}

#[test]
fn test_method_not_allowed_has_allow_header() {
    let (kernel, _) = common::kernel();
    let response = kernel.handle(Request::new(Method::DELETE, "/contact"));

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, POST");
    assert!(common::html(&response).contains("DELETE is not accepted at /contact."));
}

#[test]
fn test_method_override_reaches_405() {
    let (kernel, _) = common::kernel();
    let response = kernel.handle(Request::post_form("/", &[("_method", "put")]));
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
}

#[test]
fn test_head_is_served_by_get_routes() {
    let (kernel, _) = common::kernel();
    let response = kernel.handle(Request::new(Method::HEAD, "/"));
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn test_shared_data_does_not_leak_between_requests() {
    let (kernel, _) = common::kernel();
    let _ = kernel.handle(Request::get("/contact"));
    assert!(kernel.views().shared().get("current_route").is_none());
    assert!(kernel.views().shared().get("flash").is_none());
    assert_eq!(kernel.views().shared()["app_name"], "Trellis");
}
