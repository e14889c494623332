//! Global stores for application state.
//!
//! Components read from stores reactively; the chat session layer is the
//! only writer.

pub mod chat;

pub use chat::{ChatLog, CHAT_LOG};
