//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! `path` query parameter ("fs/readdir", "kv/get", "chat/completions")
//!     → route.rs (split, resolve category + method)
//!     → Route (closed enum) or RouteError
//!     → payload.rs (endpoint + payload for the upstream service)
//!     → OutboundRequest
//! ```
//!
//! # Design Decisions
//! - The routing table is code, not configuration
//! - Resolution is pure: no I/O, no shared state
//! - Unknown or unmapped routes fail before the upstream is contacted

pub mod payload;
pub mod route;

pub use payload::{stream_requested, OutboundRequest, DEFAULT_CHAT_MODEL, DRIVER_CALL_ENDPOINT};
pub use route::{AiOp, FsOp, Route, RouteError};
