//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay handler, streaming, lifecycle produce:
//!     → logging.rs (structured tracing events, request_id field)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
