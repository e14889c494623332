//! Native transport loop built on tokio-tungstenite.
//!
//! One tokio task per logical session. The task owns the socket(s), the
//! keepalive deadline and the backoff sleeps; every protocol decision is
//! delegated to the [`SessionDriver`].

#[cfg(test)]
#[path = "native_test.rs"]
mod native_test;

use std::future::Future;
use std::pin::Pin;

use botornot_shared::InboundFrame;
use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::super::session::{Directive, SessionDriver};
use super::{ClientEvent, Command, EventSink, ReconnectConfig};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type OpenFuture = Pin<
    Box<
        dyn Future<
                Output = Result<
                    (WsStream, tungstenite::handshake::client::Response),
                    tungstenite::Error,
                >,
            > + Send,
    >,
>;

/// Handle to a running connection loop.
pub(crate) struct Connection {
    commands: UnboundedSender<Command>,
}

impl Connection {
    /// Spawn the connection loop for the given WebSocket URL.
    pub(crate) fn open(url: String, config: ReconnectConfig, events: EventSink) -> Self {
        let (commands, receiver) = unbounded();
        tokio::spawn(connection_loop(url, config, events, receiver));
        Self { commands }
    }

    pub(crate) fn send(&self, command: Command) {
        // A closed channel means the loop already exited; nothing to do.
        let _ = self.commands.unbounded_send(command);
    }
}

/// How a transport session ended.
enum Exit {
    /// Caller asked for shutdown; the loop is done.
    Disconnected,
    /// Unexpected close or read error; retry with backoff.
    Lost,
    /// Keepalive watchdog expired; retry immediately.
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

        let lost = match connect_async(url.clone()).await {
            Ok((socket, _)) => {
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

/// Sleep out a backoff delay, still honoring `Disconnect`.
/// Returns `false` when the loop should stop.
async fn backoff_sleep(
    delay: std::time::Duration,
    driver: &mut SessionDriver,
    events: &EventSink,
    commands: &mut UnboundedReceiver<Command>,
) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return true,
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

/// Drive one transport until it ends.
///
/// During a server-directed handoff both sockets are alive: the current
/// one keeps dispatching while the replacement is held back until its
/// welcome, at which point the old socket is retired and anything the
/// replacement delivered early is replayed in order.
async fn run_transport(
    socket: WsStream,
    driver: &mut SessionDriver,
    events: &EventSink,
    commands: &mut UnboundedReceiver<Command>,
) -> Exit {
    let mut current = socket;
    let mut replacement: Option<WsStream> = None;
    let mut pending_open: Option<OpenFuture> = None;
    let mut held_frames: Vec<String> = Vec::new();
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            message = current.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    handle_text(text.as_str(), driver, events, &mut deadline, &mut pending_open);
                }
                Some(Ok(Message::Close(frame))) => {
                    crate::log_info!("eventsub transport closed by server: {:?}", frame);
                    return Exit::Lost;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    crate::log_error!("eventsub read error: {}", e);
                    return Exit::Lost;
                }
                None => {
                    crate::log_info!("eventsub transport ended");
                    return Exit::Lost;
                }
            },

            opened = open_or_pending(&mut pending_open) => {
                pending_open = None;
                match opened {
                    Ok((socket, _)) => {
                        crate::log_info!("replacement transport connected");
                        replacement = Some(socket);
                    }
                    Err(e) => {
                        // The current transport stays authoritative; its
                        // close or silence will trigger normal recovery.
                        crate::log_error!("replacement transport failed: {}", e);
                        driver.replacement_lost();
                    }
                }
            },

            message = next_or_pending(&mut replacement) => match message {
                Some(Ok(Message::Text(text))) => {
                    match InboundFrame::parse(text.as_str()) {
                        Ok(InboundFrame::Welcome(session)) => {
                            let directives = driver.replacement_welcome(session);
                            let fresh = replacement.take().expect("replacement socket present");
                            let mut old = std::mem::replace(&mut current, fresh);
                            let _ = old.close(None).await;
                            apply_directives(directives, events, &mut deadline, &mut pending_open);
                            events(ClientEvent::StateChanged(driver.state()));

                            for text in std::mem::take(&mut held_frames) {
                                handle_text(&text, driver, events, &mut deadline, &mut pending_open);
                            }
                        }
                        Ok(_) => {
                            // Not processed until the old transport retires.
                            held_frames.push(text.as_str().to_string());
                        }
                        Err(e) => {
                            crate::log_error!("failed to parse replacement frame: {}", e);
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    crate::log_warn!("replacement transport closed before welcome");
                    replacement = None;
                    held_frames.clear();
                    driver.replacement_lost();
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    crate::log_error!("replacement read error: {}", e);
                    replacement = None;
                    held_frames.clear();
                    driver.replacement_lost();
                }
            },

            _ = sleep_until_opt(deadline) => {
                deadline = None;
                let directives = driver.watchdog_expired();
                if directives.is_empty() {
                    continue;
                }
                crate::log_warn!("keepalive watchdog expired; session is silent");
                apply_directives(directives, events, &mut deadline, &mut pending_open);
                events(ClientEvent::StateChanged(driver.state()));
                let _ = current.close(None).await;
                if let Some(mut socket) = replacement.take() {
                    let _ = socket.close(None).await;
                }
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
                    apply_directives(driver.disconnect(), events, &mut deadline, &mut pending_open);
                    let _ = current.close(None).await;
                    if let Some(mut socket) = replacement.take() {
                        let _ = socket.close(None).await;
                    }
                    events(ClientEvent::StateChanged(driver.state()));
                    return Exit::Disconnected;
                }
            },
        }
    }
}

/// Parse a text frame from the current transport and act on it.
fn handle_text(
    text: &str,
    driver: &mut SessionDriver,
    events: &EventSink,
    deadline: &mut Option<Instant>,
    pending_open: &mut Option<OpenFuture>,
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
    apply_directives(directives, events, deadline, pending_open);
    let after = driver.state();
    if after != before {
        events(ClientEvent::StateChanged(after));
    }
}

fn apply_directives(
    directives: Vec<Directive>,
    events: &EventSink,
    deadline: &mut Option<Instant>,
    pending_open: &mut Option<OpenFuture>,
) {
    for directive in directives {
        match directive {
            Directive::ArmWatchdog(window) => *deadline = Some(Instant::now() + window),
            Directive::ClearWatchdog => *deadline = None,
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
                *pending_open = Some(Box::pin(connect_async(url)));
            }
            // Socket ownership moves are sequenced by the call sites.
            Directive::RetireOld
            | Directive::RetryNow
            | Directive::RetryAfter { .. }
            | Directive::Fatal => {}
        }
    }
}

async fn next_or_pending(
    stream: &mut Option<WsStream>,
) -> Option<Result<Message, tungstenite::Error>> {
    match stream.as_mut() {
        Some(socket) => socket.next().await,
        None => std::future::pending().await,
    }
}

async fn open_or_pending(
    pending: &mut Option<OpenFuture>,
) -> Result<(WsStream, tungstenite::handshake::client::Response), tungstenite::Error> {
    match pending.as_mut() {
        Some(future) => future.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
