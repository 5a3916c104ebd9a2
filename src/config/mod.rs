//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! trellis.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to the kernel builder and the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, AppSection, FlashConfig, ObservabilityConfig, RoutingConfig, ServerConfig,
    TranslationConfig, ViewPathConfig, ViewsConfig,
};
pub use validation::{validate_config, ValidationError};
