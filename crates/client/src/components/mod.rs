//! Reusable UI components.

pub mod chat_message;
pub mod chat_panel;

pub use chat_message::ChatMessageLine;
pub use chat_panel::ChatPanel;
