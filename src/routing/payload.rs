//! Outbound request construction.
//!
//! Maps a resolved [`Route`] and the inbound JSON body onto the endpoint and
//! payload the upstream service expects. Driver calls use the envelope
//! `{interface, driver, method, args}`.

use serde_json::{json, Map, Value};

use crate::routing::route::{AiOp, Route};

/// Endpoint shared by every driver call.
pub const DRIVER_CALL_ENDPOINT: &str = "/drivers/call";

/// Model used when a chat completion request does not name one.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// A fully specified outbound call. Built per request, never cached.
#[derive(Clone, PartialEq)]
pub struct OutboundRequest {
    /// Path appended to the upstream base URL.
    pub endpoint: &'static str,
    /// JSON body sent upstream.
    pub payload: Value,
    /// Bearer credential.
    pub credential: String,
}

impl OutboundRequest {
    /// Build the outbound call for `route` from the inbound `body`.
    pub fn build(route: &Route, body: Value, credential: &str) -> Self {
        let (endpoint, payload) = match route {
            Route::Fs(op) => (op.endpoint(), body),
            Route::Ai(AiOp::Txt2Img) => (
                DRIVER_CALL_ENDPOINT,
                driver_call("puter-image-generation", Some("ai-image"), "generate", body),
            ),
            Route::Ai(AiOp::Chat) => (
                DRIVER_CALL_ENDPOINT,
                driver_call("puter-chat-completion", Some("ai-chat"), "complete", body),
            ),
            Route::Kv(method) => (
                DRIVER_CALL_ENDPOINT,
                driver_call("puter-kvstore", None, method, body),
            ),
            Route::Chat => (
                DRIVER_CALL_ENDPOINT,
                driver_call(
                    "puter-chat-completion",
                    Some("ai-chat"),
                    "complete",
                    chat_args(&body),
                ),
            ),
        };

        Self {
            endpoint,
            payload,
            credential: credential.to_string(),
        }
    }
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("endpoint", &self.endpoint)
            .field("payload", &self.payload)
            .field("credential", &"<redacted>")
            .finish()
    }
}

fn driver_call(interface: &str, driver: Option<&str>, method: &str, args: Value) -> Value {
    let mut envelope = Map::new();
    envelope.insert("interface".into(), Value::from(interface));
    if let Some(driver) = driver {
        envelope.insert("driver".into(), Value::from(driver));
    }
    envelope.insert("method".into(), Value::from(method));
    envelope.insert("args".into(), args);
    Value::Object(envelope)
}

/// OpenAI-compatible chat arguments with `model` and `stream` defaults.
fn chat_args(body: &Value) -> Value {
    let mut args = Map::new();
    if let Some(messages) = body.get("messages") {
        args.insert("messages".into(), messages.clone());
    }
    args.insert(
        "model".into(),
        truthy_field(body, "model").unwrap_or_else(|| json!(DEFAULT_CHAT_MODEL)),
    );
    args.insert(
        "stream".into(),
        truthy_field(body, "stream").unwrap_or(Value::Bool(false)),
    );
    Value::Object(args)
}

fn truthy_field(body: &Value, key: &str) -> Option<Value> {
    body.get(key).filter(|v| is_truthy(v)).cloned()
}

/// Whether the inbound body asks for a streamed response.
pub fn stream_requested(body: &Value) -> bool {
    body.get("stream").is_some_and(is_truthy)
}

/// Loose truthiness: `null`, `false`, zero and `""` are false.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
