//! Connection types shared by the platform-specific transport loops.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::session::SessionNotice;

/// State of the logical session, as published to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    /// Session id negotiated; subscriptions can be registered.
    Welcomed,
    /// A subscription registration is in flight.
    Subscribing,
    /// At least one subscription is active; events are expected.
    Live,
    Reconnecting { attempt: u32 },
    /// Caller-initiated shutdown. Terminal until `connect` is called again.
    Closed,
    /// Retry budget exhausted. Requires an explicit reconnect or re-login.
    Failed { reason: String },
}

impl ConnectionState {
    /// A session id exists and frames may be dispatched.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            ConnectionState::Welcomed | ConnectionState::Subscribing | ConnectionState::Live
        )
    }

    pub fn is_connecting(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. }
        )
    }
}

/// Configuration for reconnect backoff after unexpected disconnects.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of reconnect attempts before giving up.
    pub max_attempts: u32,
    /// Initial delay in milliseconds.
    pub initial_delay_ms: u32,
    /// Maximum delay in milliseconds.
    pub max_delay_ms: u32,
    /// Multiplier applied per attempt.
    pub backoff_multiplier: f32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Delay before the given zero-based attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay =
            self.initial_delay_ms as f32 * self.backoff_multiplier.powi(attempt.min(16) as i32);
        Duration::from_millis((delay as u64).min(self.max_delay_ms as u64))
    }
}

/// Commands the manager sends into the connection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    /// A subscription registration started (state bookkeeping only).
    MarkSubscribing,
    /// A subscription registration succeeded.
    MarkLive,
    /// Caller-initiated shutdown; idempotent.
    Disconnect,
}

/// Events surfaced by the connection loop to the manager.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    StateChanged(ConnectionState),
    Notice(SessionNotice),
    Notification {
        subscription_type: String,
        envelope: Value,
    },
}

/// Callback the loop uses to hand events to the manager. Invoked from the
/// loop's task; must not block.
pub(crate) type EventSink = Arc<dyn Fn(ClientEvent) + Send + Sync>;

// Platform-specific transport loop.
#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
pub(crate) use wasm::Connection;

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(not(target_arch = "wasm32"))]
pub(crate) use native::Connection;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
