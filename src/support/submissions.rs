//! Contact form submission processing.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// Receives validated contact form submissions.
pub trait ContactSubmissions: Send + Sync {
    fn submit(&self, submission: &ContactSubmission) -> Result<(), SubmissionError>;
}

/// Records submissions in the log and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSubmissions;

impl ContactSubmissions for LogSubmissions {
    fn submit(&self, submission: &ContactSubmission) -> Result<(), SubmissionError> {
        tracing::info!(
            name = %submission.name,
            email = %submission.email,
            message_len = submission.message.chars().count(),
            "Contact form submitted"
        );
        Ok(())
    }
}
