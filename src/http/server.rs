//! HTTP server setup and the relay handler.
//!
//! # Responsibilities
//! - Create Axum Router with the relay and health handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener with graceful shutdown
//! - Translate inbound requests and forward them upstream
//! - Observability (metrics, correlation IDs)

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use http_body_util::LengthLimitError;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::error::RelayError;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::response::relay_response;
use crate::observability::metrics;
use crate::routing::payload::is_truthy;
use crate::routing::{stream_requested, OutboundRequest, Route};
use crate::upstream::PuterClient;

/// Path of the relay endpoint.
pub const RELAY_PATH: &str = "/api/proxy";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: PuterClient,
    /// Loaded once at startup; `None` when no credential was configured.
    pub credential: Option<Arc<str>>,
    /// Largest inbound body read before answering 413.
    pub max_body_size: usize,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let client = PuterClient::new(&config.upstream)?;
        let credential = config.upstream.credential().map(Arc::from);

        if credential.is_none() {
            tracing::warn!("No upstream credential configured; relay requests will fail");
        }

        let state = AppState {
            client,
            credential,
            max_body_size: config.limits.max_body_size,
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The body limit is applied by the relay handler once the verb has been
    /// accepted, so axum's own default limit is turned off here.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route(RELAY_PATH, any(relay_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable());

        let router = match config.timeouts.request_secs {
            Some(secs) => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
            None => router,
        };

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RelayParams {
    path: Option<String>,
}

/// A request that passed every local check and is ready to send.
struct Prepared {
    route: Route,
    outbound: OutboundRequest,
    stream: bool,
}

/// Relay handler.
/// Validates and translates the request, then forwards it upstream.
async fn relay_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let prepared = match prepare(&state, &method, &uri, body).await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                error = %e,
                detail = ?e,
                "Rejected relay request"
            );
            let response = e.into_response();
            metrics::record_request("none", response.status().as_u16(), start);
            return response;
        }
    };

    let category = prepared.route.category();
    tracing::debug!(
        request_id = %request_id,
        category = category,
        endpoint = prepared.outbound.endpoint,
        stream = prepared.stream,
        "Relaying request"
    );

    let response = match forward(&state, prepared, &request_id).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, category = category, error = ?e, "Proxy error");
            metrics::record_upstream_error(category);
            e.into_response()
        }
    };

    metrics::record_request(category, response.status().as_u16(), start);
    response
}

/// Local checks, in order: verb, credential, route, body.
///
/// The body is only read off the connection once the first three pass.
async fn prepare(state: &AppState, method: &Method, uri: &Uri, body: Body) -> Result<Prepared, RelayError> {
    let (route, credential) = admit(state, method, uri)?;

    let body = read_body(body, state.max_body_size).await?;
    let body = parse_body(&body)?;
    let stream = stream_requested(&body);
    let outbound = OutboundRequest::build(&route, body, &credential);

    Ok(Prepared { route, outbound, stream })
}

/// Checks that need nothing but the request line: verb, credential, route.
fn admit(state: &AppState, method: &Method, uri: &Uri) -> Result<(Route, Arc<str>), RelayError> {
    if *method != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    let credential = state
        .credential
        .clone()
        .ok_or(RelayError::TokenNotConfigured)?;

    let path = Query::<RelayParams>::try_from_uri(uri)
        .ok()
        .and_then(|Query(params)| params.path)
        .unwrap_or_default();
    let route = Route::parse(&path)?;

    Ok((route, credential))
}

/// Collect the inbound body, refusing anything over `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, RelayError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        let over_limit = std::iter::successors(
            Some(&e as &(dyn std::error::Error + 'static)),
            |&err| err.source(),
        )
        .any(|err| err.is::<LengthLimitError>());
        if over_limit {
            RelayError::PayloadTooLarge
        } else {
            RelayError::BodyRead(e.to_string())
        }
    })
}

/// Parse the inbound body; an empty or falsy body is an empty object.
fn parse_body(body: &[u8]) -> Result<Value, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    let value: Value = serde_json::from_slice(body).map_err(RelayError::InvalidBody)?;
    if is_truthy(&value) {
        Ok(value)
    } else {
        Ok(json!({}))
    }
}

async fn forward(state: &AppState, prepared: Prepared, request_id: &str) -> Result<Response, RelayError> {
    let upstream = state.client.send(&prepared.outbound).await?;
    tracing::debug!(
        request_id = %request_id,
        status = %upstream.status(),
        "Upstream responded"
    );
    relay_response(upstream, prepared.stream, request_id).await
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
