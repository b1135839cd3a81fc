//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers: request id, trace, timeout, body limit)
//!     → request.rs (x-request-id generation / propagation)
//!     → server.rs relay_handler (verb, credential, route, body)
//!     → [upstream client sends OutboundRequest]
//!     → response.rs (JSON passthrough or event-stream re-framing)
//!     → error.rs (RelayError → JSON error body on any failure)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::RelayError;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer, RELAY_PATH};
