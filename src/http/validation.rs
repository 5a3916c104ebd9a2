//! Minimal input validation producing field-keyed error messages.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::http::error::HttpError;

/// Field name → list of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Collects rule failures for a set of input values.
///
/// Rules after a failed `required` on the same field are skipped so a blank
/// field reports one message.
pub struct Validator<'a> {
    input: &'a BTreeMap<String, String>,
    errors: ValidationErrors,
}

impl<'a> Validator<'a> {
    pub fn new(input: &'a BTreeMap<String, String>) -> Self {
        Self {
            input,
            errors: ValidationErrors::default(),
        }
    }

    fn value(&self, field: &str) -> Option<&'a str> {
        self.input.get(field).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn required(mut self, field: &str) -> Self {
        if self.value(field).is_none() {
            self.errors.add(field, format!("The {field} field is required."));
        }
        self
    }

    pub fn email(mut self, field: &str) -> Self {
        if self.errors.has(field) {
            return self;
        }
        if let Some(value) = self.value(field) {
            if !looks_like_email(value) {
                self.errors
                    .add(field, format!("The {field} must be a valid email address."));
            }
        }
        self
    }

    pub fn max_length(mut self, field: &str, max: usize) -> Self {
        if self.errors.has(field) {
            return self;
        }
        if let Some(value) = self.value(field) {
            if value.chars().count() > max {
                self.errors.add(
                    field,
                    format!("The {field} may not be greater than {max} characters."),
                );
            }
        }
        self
    }

    /// Finish validation; any failure becomes an `HttpError::Validation`.
    pub fn finish(self) -> Result<(), HttpError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(HttpError::Validation(self.errors))
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
