//! NDJSON to event-stream re-framing.
//!
//! Each chunk read from the upstream body is decoded as text and emitted as a
//! single `data: <text>\n\n` frame. Chunks are pulled one at a time, so
//! nothing is buffered beyond the chunk in flight, and dropping the returned
//! stream (client went away) stops reading from the upstream.

use std::convert::Infallible;
use std::fmt::Display;

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};

use crate::observability::metrics;

/// Incremental UTF-8 decoder.
///
/// A multi-byte sequence split across two chunks is held back and completed
/// by the next chunk. Bytes that can never form valid UTF-8 become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    /// Decode the next chunk, returning whatever text is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(chunk);

        let mut out = String::with_capacity(buf.len());
        let mut rest = buf.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            // Incomplete sequence at the end; wait for more bytes.
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush any held-back bytes once the input has ended.
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }
}

/// Wrap decoded text in an event-stream `data:` frame.
pub fn frame(text: &str) -> Bytes {
    Bytes::from(format!("data: {text}\n\n"))
}

struct ReframeState<S> {
    upstream: std::pin::Pin<Box<S>>,
    decoder: Utf8ChunkDecoder,
    request_id: String,
}

/// Re-frame an upstream byte stream as event-stream frames.
///
/// An upstream read error ends the stream after flushing decoded text; the
/// response status has already been sent at that point.
pub fn reframe<S, E>(upstream: S, request_id: String) -> impl Stream<Item = Result<Bytes, Infallible>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send,
{
    let state = ReframeState {
        upstream: Box::pin(upstream),
        decoder: Utf8ChunkDecoder::default(),
        request_id,
    };

    stream::unfold(Some(state), |state| async move {
        let Some(mut state) = state else {
            return None;
        };
        loop {
            match state.upstream.next().await {
                Some(Ok(chunk)) => {
                    let text = state.decoder.decode(&chunk);
                    if text.is_empty() {
                        continue;
                    }
                    metrics::record_stream_chunk();
                    return Some((Ok(frame(&text)), Some(state)));
                }
                Some(Err(e)) => {
                    tracing::warn!(
                        request_id = %state.request_id,
                        error = %e,
                        "Upstream stream failed, closing event stream"
                    );
                    return flush(state);
                }
                None => {
                    tracing::debug!(request_id = %state.request_id, "Upstream stream finished");
                    return flush(state);
                }
            }
        }
    })
}

fn flush<S>(mut state: ReframeState<S>) -> Option<(Result<Bytes, Infallible>, Option<ReframeState<S>>)> {
    let rest = state.decoder.finish();
    if rest.is_empty() {
        None
    } else {
        metrics::record_stream_chunk();
        Some((Ok(frame(&rest)), None))
    }
}
