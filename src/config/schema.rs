//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! application. All types derive Serde traits for deserialization from
//! config files, and every field has a default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Application identity and mode.
    pub app: AppSection,

    /// HTTP listener and request limits.
    pub server: ServerConfig,

    /// View roots, extension and default layout.
    pub views: ViewsConfig,

    /// Route cache settings.
    pub routing: RoutingConfig,

    /// Translation catalogues.
    pub translation: TranslationConfig,

    pub flash: FlashConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSection {
    /// Shared with every view as `app_name`.
    pub name: String,

    /// Base URL for absolute route URLs.
    pub url: String,

    /// Detailed error pages. Never enable in production.
    pub debug: bool,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "Trellis".to_string(),
            url: "http://localhost:8080".to_string(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// A named view search root.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ViewPathConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewsConfig {
    /// Search roots, highest priority first.
    pub paths: Vec<ViewPathConfig>,

    /// Template file extension, without the dot.
    pub extension: String,

    /// Layout applied when a view does not choose one.
    pub default_layout: Option<String>,

    /// Fail on missing template variables.
    pub strict: bool,

    /// Base URL for the `asset` helper.
    pub asset_url: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            paths: vec![ViewPathConfig {
                name: "app".to_string(),
                path: PathBuf::from("resources/views"),
            }],
            extension: "hbs".to_string(),
            default_layout: Some("app".to_string()),
            strict: false,
            asset_url: "/assets".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Where `route-cache` writes and boot reads the route table.
    pub cache_path: PathBuf,

    /// Load routes from the cache instead of registering them.
    pub use_cache: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("bootstrap/cache/routes.json"),
            use_cache: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Directory holding `<locale>.json` catalogues.
    pub path: PathBuf,
    pub locale: String,
    pub fallback_locale: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("resources/lang"),
            locale: "en".to_string(),
            fallback_locale: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlashConfig {
    pub cookie_name: String,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            cookie_name: crate::support::flash::DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter (trace, debug, info, warn, error, or directives).
    pub log_level: String,

    /// JSON log lines instead of human-readable ones.
    pub log_json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
