//! Chat domain model: EventSub chat event payloads and the display-side
//! message representation.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One typed span of a chat message.
///
/// Twitch splits message text into fragments so emotes, mentions and
/// cheermotes can be rendered distinctly; plain text fragments carry no
/// detail struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageFragment {
    #[serde(rename = "type")]
    pub kind: FragmentKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emote: Option<EmoteFragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention: Option<MentionFragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheermote: Option<CheermoteFragment>,
}

impl MessageFragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Text,
            text: text.into(),
            emote: None,
            mention: None,
            cheermote: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Text,
    Emote,
    Mention,
    Cheermote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmoteFragment {
    pub id: String,
    pub emote_set_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub format: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MentionFragment {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheermoteFragment {
    pub prefix: String,
    pub bits: u64,
    pub tier: u64,
}

/// Body of a chat message: full text plus its fragment spans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessageBody {
    pub text: String,
    #[serde(default)]
    pub fragments: Vec<MessageFragment>,
}

/// Event payload of a `channel.chat.message` notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelChatMessageEvent {
    pub broadcaster_user_id: String,
    pub broadcaster_user_name: String,
    pub chatter_user_id: String,
    pub chatter_user_name: String,
    pub message_id: String,
    pub message: ChatMessageBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Event payload of a `channel.chat.message_delete` notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelChatDeleteEvent {
    pub broadcaster_user_id: String,
    pub target_user_id: String,
    pub target_user_name: String,
    pub message_id: String,
}

/// A chat message as held by the display store.
///
/// Identity is the id. Deletion flips `is_deleted` in place; entries are
/// never removed by a deletion event (soft delete, rendered struck
/// through).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub chatter_name: String,
    pub text: String,
    #[serde(default)]
    pub fragments: Vec<MessageFragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// When the client received the message (the envelope timestamp is
    /// about the event, not the display).
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl From<ChannelChatMessageEvent> for ChatMessage {
    fn from(event: ChannelChatMessageEvent) -> Self {
        Self {
            id: event.message_id,
            chatter_name: event.chatter_user_name,
            text: event.message.text,
            fragments: event.message.fragments,
            color: event.color,
            timestamp: Utc::now(),
            is_deleted: false,
        }
    }
}
