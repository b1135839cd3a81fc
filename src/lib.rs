//! Puter relay library.
//!
//! A single-endpoint HTTP forwarder: `POST /api/proxy?path=<category>/<method>`
//! is translated into a call against the Puter API with a server-held bearer
//! credential, and the answer is relayed back as JSON or as an event stream.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod streaming;
pub mod upstream;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
