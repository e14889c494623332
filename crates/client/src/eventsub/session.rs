//! Pure protocol driver for the EventSub session.
//!
//! The driver is the single writer of session state. The transport loop
//! feeds it inputs (frames, timer expiries, closures) and executes the
//! directives it returns; it performs no I/O and holds no timers itself,
//! which keeps every ordering rule of the protocol testable without a
//! socket.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::time::Duration;

use botornot_shared::{InboundFrame, SessionDescriptor};
use serde_json::Value;

use super::connection::{ConnectionState, ReconnectConfig};

/// Grace factor applied to the advertised keepalive timeout before the
/// session is considered silent.
pub const WATCHDOG_GRACE: f64 = 1.5;

/// Session-level notices surfaced to handler consumers.
#[derive(Debug, Clone)]
pub enum SessionNotice {
    /// A session id was negotiated. Subscriptions from any previous
    /// session are void; the caller must re-subscribe.
    Connected { session_id: String },
    Keepalive,
    /// No frame arrived within the watchdog window. Fired exactly once
    /// before the reconnect attempt begins.
    Silenced,
    /// The provider revoked a subscription.
    Revoked { envelope: Value },
    /// The retry budget is exhausted; the session is dead until the user
    /// explicitly reconnects.
    ReconnectExhausted,
}

/// Instructions for the transport loop.
#[derive(Debug, Clone)]
pub enum Directive {
    /// (Re)arm the keepalive watchdog for the given duration.
    ArmWatchdog(Duration),
    ClearWatchdog,
    Notify(SessionNotice),
    /// Hand a notification envelope to the registered handlers.
    Dispatch {
        subscription_type: String,
        envelope: Value,
    },
    /// Open a replacement transport to the server-supplied URL while the
    /// current one keeps delivering events.
    OpenReplacement { url: String },
    /// Close the superseded transport. Emitted before anything from the
    /// replacement is dispatched.
    RetireOld,
    /// Reconnect immediately (watchdog path; does not consume an attempt).
    RetryNow,
    /// Reconnect after a backoff delay.
    RetryAfter { delay: Duration, attempt: u32 },
    /// Give up; the state is terminal until an explicit reconnect.
    Fatal,
}

/// The session state machine.
#[derive(Debug)]
pub struct SessionDriver {
    state: ConnectionState,
    session_id: Option<String>,
    keepalive_timeout: Option<Duration>,
    /// Latched once the silence notice has fired for the current gap.
    silenced: bool,
    attempt: u32,
    config: ReconnectConfig,
    replacement_pending: bool,
}

impl SessionDriver {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            state: ConnectionState::Idle,
            session_id: None,
            keepalive_timeout: None,
            silenced: false,
            attempt: 0,
            config,
            replacement_pending: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.clone()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The watchdog window: 1.5x the advertised keepalive timeout.
    pub fn watchdog_window(&self) -> Option<Duration> {
        self.keepalive_timeout
            .map(|t| Duration::from_millis((t.as_millis() as f64 * WATCHDOG_GRACE) as u64))
    }

    /// A transport attempt is starting.
    pub fn connect_started(&mut self) {
        self.state = if self.attempt == 0 {
            ConnectionState::Connecting
        } else {
            ConnectionState::Reconnecting {
                attempt: self.attempt,
            }
        };
    }

    /// A frame arrived on the current transport.
    pub fn frame(&mut self, frame: InboundFrame) -> Vec<Directive> {
        let mut directives = Vec::new();

        match frame {
            InboundFrame::Welcome(session) => {
                self.process_welcome(session, &mut directives);
            }
            InboundFrame::Keepalive => {
                self.rearm(&mut directives);
                directives.push(Directive::Notify(SessionNotice::Keepalive));
            }
            InboundFrame::Notification {
                subscription_type,
                envelope,
            } => {
                self.rearm(&mut directives);
                // Never dispatch before the session has been welcomed.
                if self.state.is_open() {
                    directives.push(Directive::Dispatch {
                        subscription_type,
                        envelope,
                    });
                }
            }
            InboundFrame::Reconnect(session) => {
                self.rearm(&mut directives);
                if let Some(url) = session.reconnect_url {
                    self.replacement_pending = true;
                    directives.push(Directive::OpenReplacement { url });
                }
                // A reconnect frame without a URL leaves the watchdog to
                // catch the dying session.
            }
            InboundFrame::Revocation { envelope, .. } => {
                self.rearm(&mut directives);
                directives.push(Directive::Notify(SessionNotice::Revoked { envelope }));
            }
            InboundFrame::Unknown { .. } => {
                // Logged by the loop; still proof the peer is alive.
                self.rearm(&mut directives);
            }
        }

        directives
    }

    /// The replacement transport delivered its welcome. The old transport
    /// is retired before anything else happens on the new one.
    pub fn replacement_welcome(&mut self, session: SessionDescriptor) -> Vec<Directive> {
        let mut directives = vec![Directive::RetireOld];
        self.replacement_pending = false;
        self.process_welcome(session, &mut directives);
        directives
    }

    /// The replacement transport failed before reaching its welcome. The
    /// current transport stays authoritative.
    pub fn replacement_lost(&mut self) {
        self.replacement_pending = false;
    }

    pub fn replacement_pending(&self) -> bool {
        self.replacement_pending
    }

    /// The keepalive watchdog expired: the connection is half-open.
    pub fn watchdog_expired(&mut self) -> Vec<Directive> {
        if matches!(
            self.state,
            ConnectionState::Closed | ConnectionState::Failed { .. }
        ) {
            return Vec::new();
        }
        if self.silenced {
            // Already reported for this gap; a stale timer must not fire a
            // second notice.
            return Vec::new();
        }
        self.silenced = true;
        self.state = ConnectionState::Reconnecting {
            attempt: self.attempt,
        };
        vec![
            Directive::ClearWatchdog,
            Directive::Notify(SessionNotice::Silenced),
            Directive::RetryNow,
        ]
    }

    /// The transport closed unexpectedly or could not be established.
    pub fn transport_lost(&mut self) -> Vec<Directive> {
        if matches!(
            self.state,
            ConnectionState::Closed | ConnectionState::Failed { .. }
        ) {
            return Vec::new();
        }
        self.replacement_pending = false;
        self.attempt += 1;
        if self.attempt > self.config.max_attempts {
            let reason = format!(
                "max reconnect attempts ({}) exceeded",
                self.config.max_attempts
            );
            self.state = ConnectionState::Failed { reason };
            return vec![
                Directive::ClearWatchdog,
                Directive::Notify(SessionNotice::ReconnectExhausted),
                Directive::Fatal,
            ];
        }
        self.state = ConnectionState::Reconnecting {
            attempt: self.attempt,
        };
        vec![
            Directive::ClearWatchdog,
            Directive::RetryAfter {
                delay: self.config.delay_for_attempt(self.attempt - 1),
                attempt: self.attempt,
            },
        ]
    }

    /// Caller-initiated shutdown; safe to call repeatedly.
    pub fn disconnect(&mut self) -> Vec<Directive> {
        if self.state == ConnectionState::Closed {
            return Vec::new();
        }
        self.state = ConnectionState::Closed;
        self.session_id = None;
        self.replacement_pending = false;
        vec![Directive::ClearWatchdog]
    }

    /// A subscription registration started.
    pub fn mark_subscribing(&mut self) {
        if self.state == ConnectionState::Welcomed {
            self.state = ConnectionState::Subscribing;
        }
    }

    /// A subscription registration succeeded.
    pub fn mark_live(&mut self) {
        if matches!(
            self.state,
            ConnectionState::Welcomed | ConnectionState::Subscribing
        ) {
            self.state = ConnectionState::Live;
        }
    }

    fn process_welcome(&mut self, session: SessionDescriptor, directives: &mut Vec<Directive>) {
        self.session_id = Some(session.id.clone());
        if let Some(secs) = session.keepalive_timeout_seconds {
            self.keepalive_timeout = Some(Duration::from_secs(secs));
        }
        self.attempt = 0;
        self.silenced = false;
        self.state = ConnectionState::Welcomed;

        if let Some(window) = self.watchdog_window() {
            directives.push(Directive::ArmWatchdog(window));
        }
        directives.push(Directive::Notify(SessionNotice::Connected {
            session_id: session.id,
        }));
    }

    fn rearm(&mut self, directives: &mut Vec<Directive>) {
        self.silenced = false;
        if let Some(window) = self.watchdog_window() {
            directives.push(Directive::ArmWatchdog(window));
        }
    }
}
