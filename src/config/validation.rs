//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check view roots are uniquely named
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - File system checks happen at boot, not here

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.app.name.trim().is_empty() {
        errors.push(ValidationError::new("app.name", "must not be empty"));
    }
    match Url::parse(&config.app.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "app.url",
            format!("unsupported scheme `{}`", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("app.url", e.to_string())),
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("`{}` is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be greater than 0"));
    }
    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::new("server.max_body_bytes", "must be greater than 0"));
    }

    if config.views.paths.is_empty() {
        errors.push(ValidationError::new("views.paths", "at least one view root is required"));
    }
    let mut names = HashSet::new();
    for root in &config.views.paths {
        if !names.insert(root.name.as_str()) {
            errors.push(ValidationError::new(
                "views.paths",
                format!("duplicate root name `{}`", root.name),
            ));
        }
    }
    let extension = config.views.extension.as_str();
    if extension.is_empty() || extension.contains(['.', '/', '\\']) {
        errors.push(ValidationError::new(
            "views.extension",
            format!("`{extension}` is not a file extension"),
        ));
    }
    if !config.views.asset_url.starts_with('/') && Url::parse(&config.views.asset_url).is_err() {
        errors.push(ValidationError::new(
            "views.asset_url",
            "must be an absolute path or URL",
        ));
    }

    if config.translation.locale.is_empty() {
        errors.push(ValidationError::new("translation.locale", "must not be empty"));
    }

    let cookie = &config.flash.cookie_name;
    if cookie.is_empty() || !cookie.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        errors.push(ValidationError::new(
            "flash.cookie_name",
            "must be non-empty and use only letters, digits, `_` and `-`",
        ));
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("`{}` is not a valid filter", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ViewPathConfig;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = AppConfig::default();
        config.app.name = " ".into();
        config.app.url = "ftp://example.com".into();
        config.server.max_body_bytes = 0;
        config.views.paths.push(ViewPathConfig {
            name: "app".into(),
            path: "elsewhere".into(),
        });
        config.views.extension = ".hbs".into();
        config.flash.cookie_name = "bad name".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "localhost".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "app.name",
                "app.url",
                "server.max_body_bytes",
                "views.paths",
                "views.extension",
                "flash.cookie_name",
                "observability.metrics_address",
            ]
        );
    }

    #[test]
    fn test_asset_url_may_be_absolute() {
        let mut config = AppConfig::default();
        config.views.asset_url = "https://cdn.example.com/static".into();
        assert!(validate_config(&config).is_ok());
        config.views.asset_url = "static".into();
        assert!(validate_config(&config).is_err());
    }
}
