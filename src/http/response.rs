//! Upstream response relay.
//!
//! # Responsibilities
//! - Decide between event-stream re-framing and JSON passthrough
//! - Relay the upstream status code with the decoded JSON body
//! - Map body decode failures to proxy errors
//!
//! # Design Decisions
//! - The streaming check runs before the body is touched, so an NDJSON body
//!   is never fed to the JSON decoder
//! - Upstream headers other than the status are not forwarded

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::http::error::RelayError;
use crate::streaming;

/// Whether an upstream content type announces newline-delimited JSON.
pub fn is_ndjson(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("ndjson"))
}

/// Relay an upstream response to the caller.
pub async fn relay_response(
    upstream: reqwest::Response,
    stream_requested: bool,
    request_id: &str,
) -> Result<Response, RelayError> {
    if stream_requested && is_ndjson(upstream.headers()) {
        tracing::debug!(request_id = %request_id, "Re-framing NDJSON upstream as event stream");
        return event_stream(upstream, request_id);
    }

    let status = upstream.status();
    let data: Value = upstream.json().await?;
    Ok((status, Json(data)).into_response())
}

fn event_stream(upstream: reqwest::Response, request_id: &str) -> Result<Response, RelayError> {
    let frames = streaming::reframe(upstream.bytes_stream(), request_id.to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .header(CONNECTION, "keep-alive")
        .body(Body::from_stream(frames))
        .map_err(|e| RelayError::Proxy(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_is_ndjson() {
        let mut headers = HeaderMap::new();
        assert!(!is_ndjson(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_ndjson(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-ndjson; charset=utf-8"));
        assert!(is_ndjson(&headers));
    }
}
