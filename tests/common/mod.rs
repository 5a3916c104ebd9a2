//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::http::header::{HeaderValue, COOKIE, SET_COOKIE};
use trellis::config::AppConfig;
use trellis::http::{Request, Response};
use trellis::kernel::{Kernel, KernelBuilder};
use trellis::support::{ContactSubmission, ContactSubmissions, SubmissionError};

/// Repository root, where `resources/` lives.
pub fn base_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Keeps every submission so tests can inspect them.
#[derive(Default)]
pub struct RecordingSubmissions {
    pub received: Mutex<Vec<ContactSubmission>>,
}

impl RecordingSubmissions {
    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl ContactSubmissions for RecordingSubmissions {
    fn submit(&self, submission: &ContactSubmission) -> Result<(), SubmissionError> {
        self.received.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

/// Boot the bundled application against the repository resources.
pub fn kernel_with(config: AppConfig, submissions: Arc<RecordingSubmissions>) -> Kernel {
    KernelBuilder::new(config)
        .base_dir(base_dir())
        .submissions(submissions)
        .build()
        .expect("bundled application boots")
}

pub fn kernel() -> (Kernel, Arc<RecordingSubmissions>) {
    let submissions = Arc::new(RecordingSubmissions::default());
    (kernel_with(AppConfig::default(), Arc::clone(&submissions)), submissions)
}

/// `name=value` of the first `Set-Cookie` header.
pub fn cookie_pair(response: &Response) -> Option<String> {
    let header = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    header.split(';').next().map(str::to_string)
}

pub fn with_cookie(request: Request, pair: &str) -> Request {
    request.with_header(COOKIE, HeaderValue::from_str(pair).unwrap())
}

pub fn html(response: &Response) -> &str {
    response.body_text().expect("rendered body")
}
