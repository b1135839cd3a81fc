//! Upstream service subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundRequest { endpoint, payload, credential }
//!     → client.rs (POST base_url + endpoint, Authorization: Bearer)
//!     → reqwest::Response (status, headers, unread body)
//!     → http/response.rs (relay as JSON or event stream)
//! ```
//!
//! # Design Decisions
//! - Fire-once: no retries, no backoff
//! - Connect timeout only; a slow upstream is bounded by the server-side
//!   request timeout

pub mod client;

pub use client::PuterClient;
