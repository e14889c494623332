//! Error taxonomy shared between the HTTP layer and the stream client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP-level error for Helix calls.
///
/// Non-2xx responses keep the status and body so the UI can surface a
/// meaningful banner; these are not auto-retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Network(String),
    Http { status: u16, body: String },
    Deserialize(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            ApiError::Deserialize(msg) => write!(f, "Deserialization error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Helix error bodies carry `{error, status, message}`; prefer the
    /// message for display, fall back to the raw body.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { status, body } => {
                let detail = serde_json::from_str::<HelixErrorBody>(body)
                    .ok()
                    .map(|b| b.message)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| body.clone());
                format!("HTTP {}: {}", status, detail)
            }
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HelixErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    status: u16,
    #[serde(default)]
    message: String,
}

/// Failure to register a subscription against the live session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscribeError {
    /// No session id has been negotiated yet (state below `Welcomed`).
    #[error("session not ready: subscriptions require a welcomed session")]
    NotReady,
    /// The provider rejected the registration.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Stream-session errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Operation requires a live session id (state at least `Welcomed`).
    /// This is a programmer error and is surfaced, never retried.
    #[error("session not ready: no session id has been negotiated yet")]
    NotReady,
    /// Transport could not be established; retryable with backoff.
    #[error("connection failed: {0}")]
    Connection(String),
    /// The retry budget is exhausted; requires an explicit user-triggered
    /// reconnect or re-login.
    #[error("maximum reconnect attempts exceeded")]
    MaxReconnectExceeded,
}
