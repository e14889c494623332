//! Shared types for the botornot client: Twitch EventSub wire protocol,
//! Helix REST models, the chat domain model, and the error taxonomy.

pub mod chat;
pub mod error;
pub mod eventsub;
pub mod helix;

pub use chat::*;
pub use error::*;
pub use eventsub::*;
pub use helix::*;
