//! EventSub stream client.
//!
//! This module owns the single WebSocket session to the provider's
//! notification service:
//! - negotiates the session (welcome handshake, session id capture),
//! - supervises liveness with a keepalive watchdog,
//! - executes the reconnect protocol (server-directed handoffs and
//!   backoff after unexpected disconnects),
//! - demultiplexes inbound frames to named-event handlers.
//!
//! # Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │              EventSubClient                  │
//!   │  handler registry · subscription bookkeeping │
//!   └──────────────────────────────────────────────┘
//!            │ commands              ▲ events
//!            ▼                       │
//!   ┌──────────────────────────────────────────────┐
//!   │          connection loop (per platform)      │
//!   │  socket lifecycle · timers · backoff sleeps  │
//!   └──────────────────────────────────────────────┘
//!            │ inputs                ▲ directives
//!            ▼                       │
//!   ┌──────────────────────────────────────────────┐
//!   │          SessionDriver (pure)                │
//!   │  state machine · watchdog arithmetic         │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! The driver is free of I/O and timers, so every ordering rule of the
//! protocol (no dispatch before welcome, silence fires once, handoff
//! retires the old transport exactly at the replacement's welcome) is
//! enforced and tested in one place. The platform loops only move bytes
//! and sleep.

pub mod connection;
pub mod manager;
pub mod session;

pub use connection::{ClientEvent, ConnectionState, ReconnectConfig};
pub use manager::{Credential, EventHandle, EventSubClient};
pub use session::{Directive, SessionDriver, SessionNotice};
