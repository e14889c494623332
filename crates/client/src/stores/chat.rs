//! The visible chat log.
//!
//! A bounded display buffer of [`ChatMessage`]s. Messages are appended in
//! arrival order and deduplicated by id; deletion events flip the
//! `is_deleted` flag in place so the entry stays visible, struck through.
//! Once the buffer is full the oldest entries scroll out permanently,
//! which is why deleting an unknown id is a documented no-op rather than
//! an error.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use botornot_shared::ChatMessage;
use dioxus::prelude::*;

/// Upper bound on retained display entries.
pub const DISPLAY_BUFFER_CAP: usize = 200;

/// Global chat log store. Written only by the chat session layer.
pub static CHAT_LOG: GlobalSignal<ChatLog> = Signal::global(ChatLog::default);

#[derive(Clone, PartialEq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    cap: usize,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::with_capacity(DISPLAY_BUFFER_CAP)
    }
}

impl ChatLog {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            messages: Vec::new(),
            cap,
        }
    }

    /// Append a message. Returns `false` when a message with the same id
    /// is already present (duplicate delivery).
    pub fn push(&mut self, message: ChatMessage) -> bool {
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        self.messages.push(message);
        if self.messages.len() > self.cap {
            let excess = self.messages.len() - self.cap;
            self.messages.drain(0..excess);
        }
        true
    }

    /// Soft-delete by id. Idempotent; an id that never existed or has
    /// scrolled out of the buffer is a no-op. Returns whether an entry was
    /// marked.
    pub fn mark_deleted(&mut self, id: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.is_deleted = true;
                true
            }
            None => false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
