//! Request and response models for the two Helix REST endpoints the client
//! talks to: user lookup and EventSub subscription creation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An authenticated Twitch user, as returned by `GET /helix/users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TwitchUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// Helix wraps almost every response in a `data` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub data: Vec<TwitchUser>,
}

/// Transport block of a subscription request. The only transport this
/// client uses is `websocket`, bound to the live session id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionTransport {
    pub method: String,
    pub session_id: String,
}

impl SubscriptionTransport {
    pub fn websocket(session_id: impl Into<String>) -> Self {
        Self {
            method: "websocket".to_string(),
            session_id: session_id.into(),
        }
    }
}

/// Body of `POST /helix/eventsub/subscriptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    #[serde(rename = "type")]
    pub r#type: String,
    pub version: String,
    pub condition: Value,
    pub transport: SubscriptionTransport,
}

/// A created subscription record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub status: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionResponse {
    pub data: Vec<SubscriptionRecord>,
}

/// Subscription types used by the client.
pub const SUB_CHANNEL_CHAT_MESSAGE: &str = "channel.chat.message";
pub const SUB_CHANNEL_CHAT_MESSAGE_DELETE: &str = "channel.chat.message_delete";
pub const SUB_VERSION: &str = "1";
