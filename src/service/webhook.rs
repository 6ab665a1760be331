//! HTTP surface for Slack webhooks.
//!
//! Handles:
//!   • URL-encoded slash command payloads (`/slack/grammarbot`)
//!   • JSON Events API: event_callback, url_verification (`/slack/events`)
//!   • URL-encoded interactive payloads (`/slack/interactions`)
//!   • A liveness probe (`/ping`)
//!
//! When `SLACK_SIGNING_SECRET` is set, the Slack routes require a valid
//! request signature.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Form, Json, Router,
    body::{Body, Bytes},
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{instrument, warn};

use crate::{
    base::error::ValidationError,
    interaction::{
        dispatch::{Reply, dispatch},
        inbound::{InboundEvent, SlashCommand},
    },
    runtime::Runtime,
};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-slack-signature";
const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests older (or newer) than this are treated as replays.
const MAX_CLOCK_SKEW_SECS: u64 = 300;

/// Upper bound on buffered bodies during signature verification.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the webhook router.
pub fn router(runtime: Runtime) -> Router {
    let slack = Router::new()
        .route("/slack/grammarbot", post(handle_slash_command))
        .route("/slack/events", post(handle_events))
        .route("/slack/interactions", post(handle_interactions))
        .route_layer(middleware::from_fn_with_state(runtime.clone(), verify_signature));

    Router::new().merge(slack).route("/ping", get(ping).post(ping)).with_state(runtime)
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(value) => Json(value).into_response(),
            Reply::Ack => StatusCode::OK.into_response(),
            Reply::BadRequest => StatusCode::BAD_REQUEST.into_response(),
            Reply::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

// Handlers.

async fn ping() -> &'static str {
    "OK"
}

#[instrument(skip_all)]
async fn handle_slash_command(State(runtime): State<Runtime>, Form(command): Form<SlashCommand>) -> Response {
    dispatch(&runtime, InboundEvent::slash_command(command)).await.into_response()
}

#[instrument(skip_all)]
async fn handle_events(State(runtime): State<Runtime>, body: Bytes) -> Response {
    match InboundEvent::from_events_body(&body) {
        Ok(event) => dispatch(&runtime, event).await.into_response(),
        Err(err) => {
            warn!("Rejected events payload: {}", err);
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

/// Interaction callbacks wrap their JSON in a single form field.
#[derive(Deserialize)]
struct InteractionForm {
    #[serde(default)]
    payload: Option<String>,
}

#[instrument(skip_all)]
async fn handle_interactions(State(runtime): State<Runtime>, Form(form): Form<InteractionForm>) -> Response {
    match InboundEvent::from_interaction_payload(form.payload.as_deref()) {
        Ok(event) => dispatch(&runtime, event).await.into_response(),
        Err(err) => {
            warn!("Rejected interaction payload: {}", err);
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

// Signature verification.

async fn verify_signature(State(runtime): State<Runtime>, request: Request, next: Next) -> Response {
    let Some(secret) = runtime.config.slack_signing_secret.as_deref().filter(|s| !s.is_empty()) else {
        return next.run(request).await;
    };

    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Rejected webhook request: unreadable body: {}", err);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());
    let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or_default();

    if let Err(err) = check_signature(secret, header(TIMESTAMP_HEADER), header(SIGNATURE_HEADER), &bytes, now) {
        warn!("Rejected webhook request: {}", err);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Check a Slack `v0` signature: HMAC-SHA256 over `v0:<timestamp>:<body>`.
pub fn check_signature(secret: &str, timestamp: Option<&str>, signature: Option<&str>, body: &[u8], now: i64) -> Result<(), ValidationError> {
    let timestamp = timestamp.ok_or(ValidationError::MissingField("X-Slack-Request-Timestamp"))?;
    let signature = signature.ok_or(ValidationError::MissingField("X-Slack-Signature"))?;

    let sent_at: i64 = timestamp.parse().map_err(|_| ValidationError::Payload("invalid request timestamp".to_string()))?;

    if now.abs_diff(sent_at) > MAX_CLOCK_SKEW_SECS {
        return Err(ValidationError::Payload("stale request timestamp".to_string()));
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|encoded| hex::decode(encoded).ok())
        .ok_or_else(|| ValidationError::Payload("malformed signature".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| ValidationError::Payload(e.to_string()))?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);

    mac.verify_slice(&expected).map_err(|_| ValidationError::Payload("signature mismatch".to_string()))
}

// Tests.
