//! Trellis: a small synchronous MVC web framework.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum, limits, request ID)
//!                         │ spawn_blocking
//!                         ▼
//!                     kernel ──▶ routing (match, middleware, action)
//!                         │           │
//!                         │           ▼
//!                         │       app controllers ──▶ Response::view(...)
//!                         ▼
//!                     views (finder → renderer → layout)
//!                         │
//!     Client Response ◀───┘ kernel::errors for 404/405/422/500
//! ```

pub mod app;
pub mod config;
pub mod http;
pub mod kernel;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod support;
pub mod views;

pub use config::AppConfig;
pub use http::HttpServer;
pub use kernel::{Kernel, KernelBuilder};
pub use lifecycle::Shutdown;
