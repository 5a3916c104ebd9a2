//! View subsystem.
//!
//! # Data Flow
//! ```text
//! Response::view("contact", data)
//!     → factory.rs make(): merge shared data under call data
//!     → finder.rs (name → file under a search root)
//!     → renderer.rs (Handlebars, inside an output capture)
//!     → layout.rs (wrap in default or named layout)
//!     → HTML string
//! ```
//!
//! # Design Decisions
//! - Finder, renderer and layout manager are built once and shared
//! - The factory is cloned per request; its shared data is request-scoped
//! - Helpers (`t`, `route`, `asset`, `partial`) are registered at boot

pub mod capture;
pub mod error;
pub mod factory;
pub mod finder;
pub mod helpers;
pub mod layout;
pub mod renderer;

pub use capture::OutputCapture;
pub use error::ViewError;
pub use factory::ViewFactory;
pub use finder::ViewFinder;
pub use helpers::ViewHelpers;
pub use layout::{LayoutManager, CONTENT_KEY};
pub use renderer::{overlay, view_data, ViewRenderer};

/// Template data: top-level keys become template bindings.
pub type ViewData = serde_json::Map<String, serde_json::Value>;

/// Which layout wraps a rendered view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Layout {
    /// The configured default layout, if any.
    #[default]
    Default,
    Named(String),
    /// Render the view bare.
    Disabled,
}

impl Layout {
    pub fn named(name: impl Into<String>) -> Self {
        Layout::Named(name.into())
    }
}
