//! Streaming response relay.
//!
//! # Data Flow
//! ```text
//! upstream body (application/x-ndjson, chunked)
//!     → ndjson.rs Utf8ChunkDecoder (bytes → text, one chunk at a time)
//!     → ndjson.rs frame ("data: <text>\n\n")
//!     → axum Body::from_stream → client (text/event-stream)
//! ```
//!
//! # Design Decisions
//! - Pull-based: the client body drives upstream reads
//! - One upstream chunk becomes exactly one event-stream frame
//! - Mid-stream upstream errors end the stream; the status line is already sent

pub mod ndjson;

pub use ndjson::{frame, reframe, Utf8ChunkDecoder};
