//! Browser transport loop built on `web_sys::WebSocket`.
//!
//! The browser socket is callback-based, so its events are bridged into a
//! channel and consumed by the same driver-directed loop the native build
//! runs. Timers come from `gloo-timers`.

use std::time::Duration;

use botornot_shared::InboundFrame;
use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::future::{Fuse, LocalBoxFuture};
use futures_util::{select, FutureExt, StreamExt};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{js_sys, CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};

use super::super::session::{Directive, SessionDriver};
use super::{ClientEvent, Command, EventSink, ReconnectConfig};

type OpenFuture = Fuse<LocalBoxFuture<'static, Result<WasmSocket, String>>>;

/// Handle to a running connection loop.
pub(crate) struct Connection {
    commands: UnboundedSender<Command>,
}

impl Connection {
    /// Spawn the connection loop for the given WebSocket URL.
    pub(crate) fn open(url: String, config: ReconnectConfig, events: EventSink) -> Self {
        let (commands, receiver) = unbounded();
        spawn_local(connection_loop(url, config, events, receiver));
        Self { commands }
    }

    pub(crate) fn send(&self, command: Command) {
        let _ = self.commands.unbounded_send(command);
    }
}

enum SocketEvent {
    Open,
    Text(String),
    Closed,
}

/// A browser WebSocket with its events bridged into a channel.
struct WasmSocket {
    ws: WebSocket,
    events: UnboundedReceiver<SocketEvent>,
}

impl Drop for WasmSocket {
    fn drop(&mut self) {
        let _ = self.ws.close();
    }
}

enum Exit {
    Disconnected,
    Lost,
    Silenced,
}

async fn connection_loop(
    url: String,
    config: ReconnectConfig,
    events: EventSink,
    mut commands: UnboundedReceiver<Command>,
) {
    let mut driver = SessionDriver::new(config);

    loop {
        driver.connect_started();
        events(ClientEvent::StateChanged(driver.state()));

        let lost = match open_socket(url.clone()).await {
            Ok(socket) => {
                crate::log_info!("eventsub transport connected: {}", url);
                match run_transport(socket, &mut driver, &events, &mut commands).await {
                    Exit::Disconnected => return,
                    Exit::Silenced => {
                        events(ClientEvent::StateChanged(driver.state()));
                        continue;
                    }
                    Exit::Lost => true,
                }
            }
            Err(e) => {
                crate::log_error!("eventsub connect to {} failed: {}", url, e);
                true
            }
        };

        if lost {
            let directives = driver.transport_lost();
            events(ClientEvent::StateChanged(driver.state()));

            let mut retry_delay = None;
            let mut fatal = false;
            for directive in directives {
                match directive {
                    Directive::Notify(notice) => events(ClientEvent::Notice(notice)),
                    Directive::RetryAfter { delay, attempt } => {
                        crate::log_info!(
                            "reconnecting in {}ms (attempt {})",
                            delay.as_millis(),
                            attempt
                        );
                        retry_delay = Some(delay);
                    }
                    Directive::Fatal => fatal = true,
                    _ => {}
                }
            }

            if fatal {
                crate::log_error!("eventsub retry budget exhausted; giving up");
                return;
            }
            let Some(delay) = retry_delay else {
                return;
            };
            if !backoff_sleep(delay, &mut driver, &events, &mut commands).await {
                return;
            }
        }
    }
}

async fn backoff_sleep(
    delay: Duration,
    driver: &mut SessionDriver,
    events: &EventSink,
    commands: &mut UnboundedReceiver<Command>,
) -> bool {
    let mut sleep = TimeoutFuture::new(delay.as_millis() as u32).fuse();
    loop {
        select! {
            _ = sleep => return true,
            command = commands.next() => match command {
                Some(Command::Disconnect) | None => {
                    driver.disconnect();
                    events(ClientEvent::StateChanged(driver.state()));
                    return false;
                }
                Some(_) => {}
            },
        }
    }
}

async fn run_transport(
    socket: WasmSocket,
    driver: &mut SessionDriver,
    events: &EventSink,
    commands: &mut UnboundedReceiver<Command>,
) -> Exit {
    let mut current = socket;
    let mut replacement: Option<WasmSocket> = None;
    let mut pending_open: OpenFuture = Fuse::terminated();
    let mut held_frames: Vec<String> = Vec::new();
    let mut watchdog: Fuse<TimeoutFuture> = Fuse::terminated();

    loop {
        select! {
            event = current.events.next() => match event {
                Some(SocketEvent::Text(text)) => {
                    handle_text(&text, driver, events, &mut watchdog, &mut pending_open);
                }
                Some(SocketEvent::Open) => {}
                Some(SocketEvent::Closed) | None => {
                    crate::log_info!("eventsub transport closed");
                    return Exit::Lost;
                }
            },

            opened = &mut pending_open => match opened {
                Ok(socket) => {
                    crate::log_info!("replacement transport connected");
                    replacement = Some(socket);
                }
                Err(e) => {
                    crate::log_error!("replacement transport failed: {}", e);
                    driver.replacement_lost();
                }
            },

            event = next_or_pending(&mut replacement).boxed_local().fuse() => match event {
                Some(SocketEvent::Text(text)) => {
                    match InboundFrame::parse(&text) {
                        Ok(InboundFrame::Welcome(session)) => {
                            let directives = driver.replacement_welcome(session);
                            let fresh = replacement.take().expect("replacement socket present");
                            // Dropping the old socket closes it.
                            current = fresh;
                            apply_directives(directives, events, &mut watchdog, &mut pending_open);
                            events(ClientEvent::StateChanged(driver.state()));

                            for text in std::mem::take(&mut held_frames) {
                                handle_text(&text, driver, events, &mut watchdog, &mut pending_open);
                            }
                        }
                        Ok(_) => {
                            held_frames.push(text);
                        }
                        Err(e) => {
                            crate::log_error!("failed to parse replacement frame: {}", e);
                        }
                    }
                }
                Some(SocketEvent::Open) => {}
                Some(SocketEvent::Closed) | None => {
                    crate::log_warn!("replacement transport closed before welcome");
                    replacement = None;
                    held_frames.clear();
                    driver.replacement_lost();
                }
            },

            _ = watchdog => {
                let directives = driver.watchdog_expired();
                if directives.is_empty() {
                    continue;
                }
                crate::log_warn!("keepalive watchdog expired; session is silent");
                apply_directives(directives, events, &mut watchdog, &mut pending_open);
                events(ClientEvent::StateChanged(driver.state()));
                return Exit::Silenced;
            },

            command = commands.next() => match command {
                Some(Command::MarkSubscribing) => {
                    driver.mark_subscribing();
                    events(ClientEvent::StateChanged(driver.state()));
                }
                Some(Command::MarkLive) => {
                    driver.mark_live();
                    events(ClientEvent::StateChanged(driver.state()));
                }
                Some(Command::Disconnect) | None => {
                    apply_directives(driver.disconnect(), events, &mut watchdog, &mut pending_open);
                    events(ClientEvent::StateChanged(driver.state()));
                    return Exit::Disconnected;
                }
            },
        }
    }
}

fn handle_text(
    text: &str,
    driver: &mut SessionDriver,
    events: &EventSink,
    watchdog: &mut Fuse<TimeoutFuture>,
    pending_open: &mut OpenFuture,
) {
    let frame = match InboundFrame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            crate::log_error!("failed to parse frame: {}", e);
            return;
        }
    };
    if let InboundFrame::Unknown { message_type } = &frame {
        crate::log_warn!("ignoring unknown message type: {}", message_type);
    }

    let before = driver.state();
    let directives = driver.frame(frame);
    apply_directives(directives, events, watchdog, pending_open);
    let after = driver.state();
    if after != before {
        events(ClientEvent::StateChanged(after));
    }
}

fn apply_directives(
    directives: Vec<Directive>,
    events: &EventSink,
    watchdog: &mut Fuse<TimeoutFuture>,
    pending_open: &mut OpenFuture,
) {
    for directive in directives {
        match directive {
            Directive::ArmWatchdog(window) => {
                *watchdog = TimeoutFuture::new(window.as_millis() as u32).fuse();
            }
            Directive::ClearWatchdog => *watchdog = Fuse::terminated(),
            Directive::Notify(notice) => events(ClientEvent::Notice(notice)),
            Directive::Dispatch {
                subscription_type,
                envelope,
            } => events(ClientEvent::Notification {
                subscription_type,
                envelope,
            }),
            Directive::OpenReplacement { url } => {
                crate::log_info!("server directed reconnect to {}", url);
                *pending_open = open_socket(url).boxed_local().fuse();
            }
            Directive::RetireOld
            | Directive::RetryNow
            | Directive::RetryAfter { .. }
            | Directive::Fatal => {}
        }
    }
}

async fn next_or_pending(socket: &mut Option<WasmSocket>) -> Option<SocketEvent> {
    match socket.as_mut() {
        Some(socket) => socket.events.next().await,
        None => std::future::pending().await,
    }
}

/// Create a WebSocket and wait for it to open, bridging its callbacks into
/// a channel.
async fn open_socket(url: String) -> Result<WasmSocket, String> {
    let ws =
        WebSocket::new(&url).map_err(|e| format!("failed to create WebSocket: {:?}", e))?;
    let (tx, mut events) = unbounded();

    let tx_open = tx.clone();
    let onopen = Closure::wrap(Box::new(move |_: Event| {
        let _ = tx_open.unbounded_send(SocketEvent::Open);
    }) as Box<dyn FnMut(Event)>);
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let tx_msg = tx.clone();
    let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
        if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
            let text: String = text.into();
            let _ = tx_msg.unbounded_send(SocketEvent::Text(text));
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let tx_close = tx.clone();
    let onclose = Closure::wrap(Box::new(move |e: CloseEvent| {
        crate::log_info!("websocket closed: {} {}", e.code(), e.reason());
        let _ = tx_close.unbounded_send(SocketEvent::Closed);
    }) as Box<dyn FnMut(CloseEvent)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    let tx_err = tx.clone();
    let onerror = Closure::wrap(Box::new(move |_: ErrorEvent| {
        let _ = tx_err.unbounded_send(SocketEvent::Closed);
    }) as Box<dyn FnMut(ErrorEvent)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    let mut timeout = TimeoutFuture::new(5_000).fuse();
    loop {
        select! {
            event = events.next() => match event {
                Some(SocketEvent::Open) => {
                    return Ok(WasmSocket { ws, events });
                }
                Some(SocketEvent::Closed) | None => {
                    let _ = ws.close();
                    return Err("socket closed during handshake".to_string());
                }
                Some(SocketEvent::Text(_)) => {}
            },
            _ = timeout => {
                let _ = ws.close();
                return Err("connection timeout".to_string());
            }
        }
    }
}
