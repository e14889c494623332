//! botornot client - Dioxus application
//!
//! A web/desktop client for the "Chat or Chatbot" streamer game: it
//! authenticates against Twitch, follows the streamer's own chat over an
//! EventSub WebSocket session, intercepts a share of the messages as game
//! material, and lets the streamer guess which messages are real.

pub mod api_client;
pub mod auth_session;
pub mod chat_session;
pub mod components;
pub mod config;
pub mod eventsub;
pub mod game;
pub mod logging;
pub mod routes;
pub mod runtime;
pub mod storage;
pub mod stores;
pub mod views;

pub use api_client::HelixClient;
pub use auth_session::{AuthContext, AuthProvider, AuthSession};
pub use chat_session::{ChatSession, ChatSessionProvider};
pub use eventsub::{Credential, EventSubClient};
pub use routes::Route;
