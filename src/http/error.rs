//! Relay error classification and HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::routing::RouteError;

/// Errors terminal for a single relay request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound verb is not POST.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No bearer credential was configured at startup.
    #[error("Puter token not configured")]
    TokenNotConfigured,

    /// First path segment is not a known category.
    #[error("Unknown category")]
    UnknownCategory(String),

    /// Known category, unmapped method.
    #[error("Unsupported method")]
    UnsupportedMethod(String),

    /// Inbound body exceeds `limits.max_body_size`.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Inbound body could not be read off the connection.
    #[error("Failed to read request body")]
    BodyRead(String),

    /// Inbound body is not JSON.
    #[error("Invalid JSON body")]
    InvalidBody(#[source] serde_json::Error),

    /// Outbound call or response handling failed.
    #[error("Proxy error")]
    Proxy(String),
}

impl RelayError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::TokenNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::UnknownCategory(_) => StatusCode::BAD_REQUEST,
            RelayError::UnsupportedMethod(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::BodyRead(_) => StatusCode::BAD_REQUEST,
            RelayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RelayError::Proxy(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RouteError> for RelayError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::UnknownCategory(category) => RelayError::UnknownCategory(category),
            RouteError::UnsupportedMethod { method, .. } => RelayError::UnsupportedMethod(method),
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Proxy(err.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = match &self {
            RelayError::Proxy(details) => json!({ "error": self.to_string(), "details": details }),
            _ => json!({ "error": self.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RelayError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(RelayError::TokenNotConfigured.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(RelayError::UnknownCategory("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::UnsupportedMethod("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(RelayError::BodyRead("reset".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::Proxy("boom".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_route_error_conversion() {
        let err: RelayError = RouteError::UnsupportedMethod {
            category: "fs",
            method: "delete".into(),
        }
        .into();
        assert!(matches!(err, RelayError::UnsupportedMethod(ref m) if m == "delete"));
        assert_eq!(err.to_string(), "Unsupported method");
    }

    #[tokio::test]
    async fn test_proxy_error_body() {
        let response = RelayError::Proxy("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"error": "Proxy error", "details": "connection refused"}));
    }
}
