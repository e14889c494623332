//! Twitch EventSub WebSocket wire protocol.
//!
//! Every frame is a JSON text message with an envelope of
//! `{metadata: {...}, payload: {...}}`. The `message_type` field of the
//! metadata selects the payload shape. Frames are parsed once into an
//! [`InboundFrame`] and dispatched once; unrecognized message types are
//! preserved as [`InboundFrame::Unknown`] so the client can log and skip
//! them without treating new server-side frame types as fatal.

#[cfg(test)]
#[path = "eventsub_test.rs"]
mod eventsub_test;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frame metadata common to every EventSub WebSocket message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameMetadata {
    pub message_id: String,
    pub message_type: String,
    pub message_timestamp: DateTime<Utc>,
    /// Present on `notification` and `revocation` frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_version: Option<String>,
}

/// Raw frame envelope as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameEnvelope {
    pub metadata: FrameMetadata,
    #[serde(default)]
    pub payload: Value,
}

/// Session descriptor carried by `session_welcome` and `session_reconnect`
/// payloads under the `session` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keepalive_timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionPayload {
    session: SessionDescriptor,
}

/// A classified inbound frame.
///
/// `Notification` keeps the full envelope as a [`Value`] alongside the
/// extracted subscription type: handlers receive the envelope verbatim and
/// pull out the slice of the payload they care about.
#[derive(Debug, Clone)]
pub enum InboundFrame {
    Welcome(SessionDescriptor),
    Keepalive,
    Notification {
        subscription_type: String,
        envelope: Value,
    },
    Reconnect(SessionDescriptor),
    Revocation {
        subscription_type: String,
        envelope: Value,
    },
    Unknown {
        message_type: String,
    },
}

/// Known `message_type` values.
pub const MESSAGE_TYPE_WELCOME: &str = "session_welcome";
pub const MESSAGE_TYPE_KEEPALIVE: &str = "session_keepalive";
pub const MESSAGE_TYPE_NOTIFICATION: &str = "notification";
pub const MESSAGE_TYPE_RECONNECT: &str = "session_reconnect";
pub const MESSAGE_TYPE_REVOCATION: &str = "revocation";

impl InboundFrame {
    /// Parse a raw text frame into a classified frame.
    ///
    /// Fails only on malformed JSON or a missing/invalid envelope; an
    /// unexpected `message_type` is not an error.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_str(text)?;
        let envelope: FrameEnvelope = serde_json::from_value(raw.clone())?;

        let frame = match envelope.metadata.message_type.as_str() {
            MESSAGE_TYPE_WELCOME => {
                let payload: SessionPayload = serde_json::from_value(envelope.payload)?;
                InboundFrame::Welcome(payload.session)
            }
            MESSAGE_TYPE_KEEPALIVE => InboundFrame::Keepalive,
            MESSAGE_TYPE_NOTIFICATION => InboundFrame::Notification {
                subscription_type: envelope
                    .metadata
                    .subscription_type
                    .unwrap_or_default(),
                envelope: raw,
            },
            MESSAGE_TYPE_RECONNECT => {
                let payload: SessionPayload = serde_json::from_value(envelope.payload)?;
                InboundFrame::Reconnect(payload.session)
            }
            MESSAGE_TYPE_REVOCATION => InboundFrame::Revocation {
                subscription_type: envelope
                    .metadata
                    .subscription_type
                    .unwrap_or_default(),
                envelope: raw,
            },
            other => InboundFrame::Unknown {
                message_type: other.to_string(),
            },
        };

        Ok(frame)
    }

    pub fn is_welcome(&self) -> bool {
        matches!(self, InboundFrame::Welcome(_))
    }
}

/// Extract the `payload.event` object from a notification envelope.
pub fn notification_event(envelope: &Value) -> Option<&Value> {
    envelope.get("payload").and_then(|p| p.get("event"))
}

/// Extract the `payload.subscription` object from a notification or
/// revocation envelope.
pub fn notification_subscription(envelope: &Value) -> Option<&Value> {
    envelope.get("payload").and_then(|p| p.get("subscription"))
}
