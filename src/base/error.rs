//! Error taxonomy for the relay.
//!
//! Plumbing (start-up, config, the listener) uses `anyhow` through
//! [`Res`](super::types::Res). The request path uses these typed errors so
//! the dispatcher can decide, per branch, whether a failure becomes a user
//! visible reply or only a log line.

use thiserror::Error;

/// The completion provider could not produce corrected text.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Transport failure, non-success status, or a response without text.
    #[error("completion provider failed: {0}")]
    Upstream(String),
}

/// A Slack Web API call failed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Slack answered with `ok: false`; carries the error code.
    #[error("slack api error: {0}")]
    Api(String),
    /// The request never produced a usable Slack response.
    #[error("slack request failed: {0}")]
    Transport(String),
}

/// An inbound request is missing something the dispatcher needs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field the branch needs is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unparseable payload: {0}")]
    /// The payload or a header could not be parsed or verified.
    Payload(String),
    #[error("unknown tone `{0}`")]
    /// A tone value outside `casual` and `professional`.
    UnknownTone(String),
}
