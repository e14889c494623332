use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use crate::eventsub::manager::{Credential, EventSubClient};
use crate::eventsub::ReconnectConfig;

fn welcome_frame(session_id: &str, keepalive_secs: u64) -> String {
    format!(
        r#"{{
            "metadata": {{"message_id": "w-{session_id}", "message_type": "session_welcome", "message_timestamp": "2024-01-10T10:00:00Z"}},
            "payload": {{"session": {{"id": "{session_id}", "status": "connected", "keepalive_timeout_seconds": {keepalive_secs}}}}}
        }}"#
    )
}

fn reconnect_frame(session_id: &str, url: &str) -> String {
    format!(
        r#"{{
            "metadata": {{"message_id": "r-{session_id}", "message_type": "session_reconnect", "message_timestamp": "2024-01-10T10:00:01Z"}},
            "payload": {{"session": {{"id": "{session_id}", "status": "reconnecting", "reconnect_url": "{url}"}}}}
        }}"#
    )
}

fn chat_frame(message_id: &str, text: &str) -> String {
    format!(
        r#"{{
            "metadata": {{"message_id": "n-{message_id}", "message_type": "notification", "message_timestamp": "2024-01-10T10:00:02Z", "subscription_type": "channel.chat.message", "subscription_version": "1"}},
            "payload": {{
                "subscription": {{"type": "channel.chat.message"}},
                "event": {{
                    "broadcaster_user_id": "100", "broadcaster_user_name": "streamer",
                    "chatter_user_id": "200", "chatter_user_name": "viewer",
                    "message_id": "{message_id}", "message": {{"text": "{text}"}}
                }}
            }}
        }}"#
    )
}

fn credential() -> Credential {
    Credential {
        client_id: "test-client".to_string(),
        access_token: "test-token".to_string(),
        user_id: "100".to_string(),
    }
}

fn wire_events(client: &EventSubClient) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    let t = tx.clone();
    client.on("connected", move |payload| {
        let _ = t.send(format!("connected:{}", payload.as_str().unwrap_or_default()));
    });
    let t = tx.clone();
    client.on("channel.chat.message", move |envelope| {
        let text = envelope["payload"]["event"]["message"]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let _ = t.send(format!("chat:{text}"));
    });
    let t = tx.clone();
    client.on("session_silenced", move |_| {
        let _ = t.send("silenced".to_string());
    });
    let t = tx;
    client.on("max_reconnect_attempts", move |_| {
        let _ = t.send("exhausted".to_string());
    });

    rx
}

async fn expect_event(rx: &mut mpsc::UnboundedReceiver<String>, want: &str) {
    let got = timeout(Duration::from_secs(10), rx.recv())
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for '{want}'"))
        .expect("event channel closed");
    assert_eq!(got, want);
}

#[tokio::test]
async fn handshake_dispatch_silence_and_recovery() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        // First connection: welcome, one chat event, then silence.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(welcome_frame("s1", 1).into()))
            .await
            .unwrap();
        ws.send(Message::Text(chat_frame("m1", "hello").into()))
            .await
            .unwrap();

        // The watchdog (1.5s) tears the session down and reconnects.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws2 = accept_async(stream).await.unwrap();
        ws2.send(Message::Text(welcome_frame("s2", 1).into()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
    });

    let client = EventSubClient::with_config(url, ReconnectConfig::default());
    let mut events = wire_events(&client);
    client.connect(credential());

    expect_event(&mut events, "connected:s1").await;
    expect_event(&mut events, "chat:hello").await;
    expect_event(&mut events, "silenced").await;
    expect_event(&mut events, "connected:s2").await;

    client.disconnect();
    server.await.unwrap();
}

#[tokio::test]
async fn server_directed_reconnect_hands_off_without_losing_events() {
    let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let second = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let first_url = format!("ws://{}", first.local_addr().unwrap());
    let second_url = format!("ws://{}", second.local_addr().unwrap());

    let old_server = tokio::spawn(async move {
        let (stream, _) = first.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(welcome_frame("s1", 10).into()))
            .await
            .unwrap();
        ws.send(Message::Text(reconnect_frame("s1", &second_url).into()))
            .await
            .unwrap();
        // The old transport keeps delivering until the replacement welcomes.
        ws.send(Message::Text(chat_frame("m1", "from-old").into()))
            .await
            .unwrap();

        // The client must close this socket once the new session is live.
        let closed = timeout(Duration::from_secs(10), async {
            loop {
                match ws.next().await {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        })
        .await;
        assert!(closed.is_ok(), "old transport was never closed");
    });

    let new_server = tokio::spawn(async move {
        let (stream, _) = second.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        // Give the old transport time to flush its last event first.
        tokio::time::sleep(Duration::from_millis(300)).await;
        ws.send(Message::Text(welcome_frame("s2", 10).into()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        ws.send(Message::Text(chat_frame("m2", "from-new").into()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
    });

    let client = EventSubClient::with_config(first_url, ReconnectConfig::default());
    let mut events = wire_events(&client);
    client.connect(credential());

    expect_event(&mut events, "connected:s1").await;
    expect_event(&mut events, "chat:from-old").await;
    expect_event(&mut events, "connected:s2").await;
    expect_event(&mut events, "chat:from-new").await;

    client.disconnect();
    old_server.await.unwrap();
    new_server.await.unwrap();
}

#[tokio::test]
async fn exhausted_retry_budget_reports_fatal_exactly_once() {
    // Nothing listens here; every attempt is refused.
    let config = ReconnectConfig {
        max_attempts: 2,
        initial_delay_ms: 50,
        max_delay_ms: 200,
        backoff_multiplier: 2.0,
    };
    let client = EventSubClient::with_config("ws://127.0.0.1:9".to_string(), config);
    let mut events = wire_events(&client);
    client.connect(credential());

    expect_event(&mut events, "exhausted").await;

    // No further events: the loop has exited for good.
    let extra = timeout(Duration::from_millis(500), events.recv()).await;
    assert!(extra.is_err(), "unexpected event after fatal: {extra:?}");
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(welcome_frame("s1", 10).into()))
            .await
            .unwrap();
        // Wait for the client-initiated close.
        let _ = timeout(Duration::from_secs(10), ws.next()).await;
    });

    let client = EventSubClient::with_config(url, ReconnectConfig::default());
    let mut events = wire_events(&client);
    client.connect(credential());
    expect_event(&mut events, "connected:s1").await;

    client.disconnect();
    client.disconnect();

    assert_eq!(client.session_id(), None);
    server.await.unwrap();
}
