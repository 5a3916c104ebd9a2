//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (kernel::boot):
//!     Load config → Validate → Build kernel → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then kernel, then listener
//! - In-flight requests finish before the process exits

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
