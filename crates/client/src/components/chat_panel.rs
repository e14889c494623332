//! The visible chat panel: the filtered live chat plus connection health.

use botornot_shared::ChatMessage;
use dioxus::prelude::*;

use crate::chat_session::ChatSession;
use crate::components::ChatMessageLine;
use crate::eventsub::ConnectionState;
use crate::stores::CHAT_LOG;

/// Live chat display fed by the router; intercepted messages never show
/// up here.
#[component]
pub fn ChatPanel() -> Element {
    let session = use_context::<ChatSession>();
    let status = session.status.read().clone();
    let health = session.health.read().clone();
    let messages: Vec<ChatMessage> = CHAT_LOG.read().messages().to_vec();

    rsx! {
        div { class: "w-full h-full flex flex-col",
            div { class: "flex-1 bg-gray-800 rounded-lg p-3 overflow-y-auto mb-2",
                if status.is_connecting() {
                    div { class: "text-yellow-500 mb-2 text-sm", "Connecting to chat…" }
                }
                if status.is_open() && messages.is_empty() {
                    div { class: "text-gray-500 text-sm",
                        "No messages yet. Start chatting in your channel!"
                    }
                }
                for message in messages {
                    ChatMessageLine { message }
                }
            }
            if let Some(note) = health {
                div { class: "text-yellow-400 text-xs text-center mb-1", "{note}" }
            }
            div { class: "text-xs text-gray-400 text-center", {connection_label(&status)} }
        }
    }
}

fn connection_label(state: &ConnectionState) -> String {
    match state {
        ConnectionState::Idle => "Not connected".to_string(),
        ConnectionState::Connecting => "Connecting…".to_string(),
        ConnectionState::Welcomed | ConnectionState::Subscribing => {
            "Connected, subscribing…".to_string()
        }
        ConnectionState::Live => "Connected to chat".to_string(),
        ConnectionState::Reconnecting { attempt } => {
            format!("Reconnecting (attempt {attempt})…")
        }
        ConnectionState::Closed => "Disconnected".to_string(),
        ConnectionState::Failed { reason } => format!("Connection failed: {reason}"),
    }
}
