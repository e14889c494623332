//! Caller-facing stream client.
//!
//! `EventSubClient` is an explicitly owned object: it is constructed by
//! whoever drives the session (the chat session provider) and handed down
//! by reference. It owns exactly one connection loop at a time, the
//! named-event handler registry, and the per-session subscribed-topics
//! set. No part of the transport is reachable from anywhere else.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

use botornot_shared::{
    notification_subscription, CreateSubscriptionRequest, SubscribeError, SubscriptionRecord,
    SubscriptionTransport,
};
use serde_json::Value;

use crate::api_client::HelixClient;

use super::connection::{ClientEvent, Command, Connection, ConnectionState, ReconnectConfig};
use super::session::SessionNotice;

/// Synthetic event names emitted by the client itself, alongside the
/// provider's subscription types.
pub const EVENT_CONNECTED: &str = "connected";
pub const EVENT_KEEPALIVE: &str = "session_keepalive";
pub const EVENT_SILENCED: &str = "session_silenced";
pub const EVENT_REVOCATION: &str = "revocation";
pub const EVENT_MAX_RECONNECT: &str = "max_reconnect_attempts";

/// Bearer credential plus the identity it resolves to.
#[derive(Debug, Clone)]
pub struct Credential {
    pub client_id: String,
    pub access_token: String,
    pub user_id: String,
}

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: std::collections::HashMap<String, Vec<(u64, Handler)>>,
}

struct Inner {
    registry: Arc<Mutex<Registry>>,
    state: Mutex<ConnectionState>,
    state_listener: Mutex<Option<Box<dyn Fn(ConnectionState) + Send + Sync>>>,
    session_id: Mutex<Option<String>>,
    subscribed: Mutex<HashSet<String>>,
    connection: Mutex<Option<Connection>>,
    helix: Mutex<Option<HelixClient>>,
    user_id: Mutex<Option<String>>,
    config: ReconnectConfig,
    ws_url: String,
}

/// The stream session manager.
#[derive(Clone)]
pub struct EventSubClient {
    inner: Arc<Inner>,
}

/// Registration receipt for a named-event handler. Calling
/// [`EventHandle::unsubscribe`] removes the handler; dropping the handle
/// leaves it registered.
pub struct EventHandle {
    event: String,
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl EventHandle {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap();
            if let Some(handlers) = registry.handlers.get_mut(&self.event) {
                handlers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl EventSubClient {
    pub fn new() -> Self {
        Self::with_config(crate::config::eventsub_ws_url(), ReconnectConfig::default())
    }

    pub fn with_config(ws_url: String, config: ReconnectConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Arc::new(Mutex::new(Registry::default())),
                state: Mutex::new(ConnectionState::Idle),
                state_listener: Mutex::new(None),
                session_id: Mutex::new(None),
                subscribed: Mutex::new(HashSet::new()),
                connection: Mutex::new(None),
                helix: Mutex::new(None),
                user_id: Mutex::new(None),
                config,
                ws_url,
            }),
        }
    }

    /// Register a handler for a named event. Handlers run in registration
    /// order; a panicking handler is isolated and logged without breaking
    /// delivery to the rest.
    pub fn on(&self, event: &str, handler: impl Fn(&Value) + Send + Sync + 'static) -> EventHandle {
        let mut registry = self.inner.registry.lock().unwrap();
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .handlers
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        EventHandle {
            event: event.to_string(),
            id,
            registry: Arc::downgrade(&self.inner.registry),
        }
    }

    /// Install a listener for connection-state changes (UI wiring).
    pub fn set_state_listener(&self, listener: impl Fn(ConnectionState) + Send + Sync + 'static) {
        *self.inner.state_listener.lock().unwrap() = Some(Box::new(listener));
    }

    /// Current connection status.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().unwrap().clone()
    }

    /// The live session id, once negotiated.
    pub fn session_id(&self) -> Option<String> {
        self.inner.session_id.lock().unwrap().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Open the streaming session with the given credential.
    ///
    /// Valid from `Idle`, `Closed` or `Failed`; a no-op while a connection
    /// loop is already running.
    pub fn connect(&self, credential: Credential) {
        {
            let state = self.inner.state.lock().unwrap();
            if !matches!(
                *state,
                ConnectionState::Idle | ConnectionState::Closed | ConnectionState::Failed { .. }
            ) {
                crate::log_warn!("connect() ignored: session already active ({:?})", *state);
                return;
            }
        }

        *self.inner.helix.lock().unwrap() = Some(HelixClient::new(
            credential.client_id.clone(),
            credential.access_token.clone(),
        ));
        *self.inner.user_id.lock().unwrap() = Some(credential.user_id);
        self.inner.subscribed.lock().unwrap().clear();

        let sink = self.event_sink();
        let connection = Connection::open(self.inner.ws_url.clone(), self.inner.config.clone(), sink);
        *self.inner.connection.lock().unwrap() = Some(connection);
    }

    /// Close the session. Idempotent: safe to call when already closed.
    pub fn disconnect(&self) {
        if let Some(connection) = self.inner.connection.lock().unwrap().take() {
            connection.send(Command::Disconnect);
        }
        *self.inner.session_id.lock().unwrap() = None;
    }

    /// Register a subscription (type, version, condition) against the live
    /// session. Fails with [`SubscribeError::NotReady`] before the welcome;
    /// an already-registered type within the same session is a no-op
    /// returning `Ok(None)`.
    pub async fn subscribe(
        &self,
        sub_type: &str,
        version: &str,
        condition: Value,
    ) -> Result<Option<SubscriptionRecord>, SubscribeError> {
        let session_id = self.session_id().ok_or(SubscribeError::NotReady)?;
        let helix = self
            .inner
            .helix
            .lock()
            .unwrap()
            .clone()
            .ok_or(SubscribeError::NotReady)?;

        {
            let mut subscribed = self.inner.subscribed.lock().unwrap();
            if subscribed.contains(sub_type) {
                crate::log_debug!("already subscribed to {} this session", sub_type);
                return Ok(None);
            }
            subscribed.insert(sub_type.to_string());
        }
        self.send_command(Command::MarkSubscribing);

        let request = CreateSubscriptionRequest {
            r#type: sub_type.to_string(),
            version: version.to_string(),
            condition,
            transport: SubscriptionTransport::websocket(session_id),
        };

        match helix.create_subscription(&request).await {
            Ok(record) => {
                crate::log_info!("subscribed to {} ({})", sub_type, record.id);
                self.send_command(Command::MarkLive);
                Ok(Some(record))
            }
            Err(e) => {
                self.inner.subscribed.lock().unwrap().remove(sub_type);
                Err(SubscribeError::Api(e))
            }
        }
    }

    /// The authenticated user id handed over at connect time.
    pub fn user_id(&self) -> Option<String> {
        self.inner.user_id.lock().unwrap().clone()
    }

    fn send_command(&self, command: Command) {
        if let Some(connection) = self.inner.connection.lock().unwrap().as_ref() {
            connection.send(command);
        }
    }

    fn event_sink(&self) -> super::connection::EventSink {
        let inner = Arc::clone(&self.inner);
        Arc::new(move |event| match event {
            ClientEvent::StateChanged(state) => {
                *inner.state.lock().unwrap() = state.clone();
                if let Some(listener) = inner.state_listener.lock().unwrap().as_ref() {
                    listener(state);
                }
            }
            ClientEvent::Notice(notice) => handle_notice(&inner, notice),
            ClientEvent::Notification {
                subscription_type,
                envelope,
            } => dispatch(&inner, &subscription_type, &envelope),
        })
    }
}

impl Default for EventSubClient {
    fn default() -> Self {
        Self::new()
    }
}

fn handle_notice(inner: &Inner, notice: SessionNotice) {
    match notice {
        SessionNotice::Connected { session_id } => {
            // A fresh session id voids every prior subscription; consumers
            // react to `connected` by re-subscribing.
            *inner.session_id.lock().unwrap() = Some(session_id.clone());
            inner.subscribed.lock().unwrap().clear();
            dispatch(inner, EVENT_CONNECTED, &Value::String(session_id));
        }
        SessionNotice::Keepalive => dispatch(inner, EVENT_KEEPALIVE, &Value::Null),
        SessionNotice::Silenced => dispatch(inner, EVENT_SILENCED, &Value::Null),
        SessionNotice::Revoked { envelope } => {
            if let Some(sub_type) = notification_subscription(&envelope)
                .and_then(|s| s.get("type"))
                .and_then(|t| t.as_str())
            {
                inner.subscribed.lock().unwrap().remove(sub_type);
            }
            dispatch(inner, EVENT_REVOCATION, &envelope);
        }
        SessionNotice::ReconnectExhausted => dispatch(inner, EVENT_MAX_RECONNECT, &Value::Null),
    }
}

/// Run the handlers registered for an event, in registration order. The
/// handler list is snapshotted so handlers may (un)register without
/// deadlocking, and each call is isolated: one panicking consumer cannot
/// break delivery to the others or the receive loop.
fn dispatch(inner: &Inner, event: &str, payload: &Value) {
    let handlers: Vec<(u64, Handler)> = {
        let registry = inner.registry.lock().unwrap();
        match registry.handlers.get(event) {
            Some(handlers) => handlers.clone(),
            None => return,
        }
    };

    for (id, handler) in handlers {
        if catch_unwind(AssertUnwindSafe(|| handler(payload))).is_err() {
            crate::log_error!("handler {} for '{}' panicked; continuing", id, event);
        }
    }
}
