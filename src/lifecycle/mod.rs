//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Overlay env → Validate → Init logging/metrics → Bind → Serve
//!
//! Shutdown:
//!     SIGINT/SIGTERM (signals.rs::shutdown_signal resolves)
//!     → axum graceful shutdown: stop accepting, drain in-flight requests
//! ```

pub mod signals;

pub use signals::shutdown_signal;
