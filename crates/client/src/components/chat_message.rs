//! One chat message line, rendered fragment by fragment.

use botornot_shared::{ChatMessage, FragmentKind, MessageFragment};
use dioxus::prelude::*;

/// A single message in the chat panel. Deleted messages stay visible,
/// struck through.
#[component]
pub fn ChatMessageLine(message: ChatMessage) -> Element {
    let row_class = if message.is_deleted {
        "mb-1 text-sm text-gray-500 line-through"
    } else {
        "mb-1 text-sm text-white"
    };
    let name_color = message.color.clone().unwrap_or_else(|| "#ffffff".to_string());
    let time = message.timestamp.format("%H:%M").to_string();

    rsx! {
        div { class: row_class,
            span { class: "text-gray-400 mr-2", "{time}" }
            span { class: "font-bold mr-1", style: "color: {name_color}", "{message.chatter_name}: " }
            if message.fragments.is_empty() {
                span { "{message.text}" }
            } else {
                for fragment in message.fragments.clone() {
                    FragmentSpan { fragment }
                }
            }
            if message.is_deleted {
                span { class: "text-xs ml-1", "(deleted)" }
            }
        }
    }
}

#[component]
fn FragmentSpan(fragment: MessageFragment) -> Element {
    match fragment.kind {
        FragmentKind::Emote => {
            if let Some(emote) = &fragment.emote {
                let src = format!(
                    "https://static-cdn.jtvnw.net/emoticons/v2/{}/default/dark/1.0",
                    emote.id
                );
                rsx! {
                    img {
                        class: "inline-block h-6",
                        src: "{src}",
                        alt: "{fragment.text}",
                        title: "{fragment.text}",
                    }
                }
            } else {
                rsx! {
                    span { "{fragment.text}" }
                }
            }
        }
        FragmentKind::Mention => rsx! {
            span { class: "bg-purple-900 text-white px-1", "{fragment.text}" }
        },
        FragmentKind::Cheermote => rsx! {
            span { class: "text-yellow-400", "{fragment.text}" }
        },
        FragmentKind::Text => rsx! {
            span { "{fragment.text}" }
        },
    }
}
