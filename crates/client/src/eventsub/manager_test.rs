use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use super::*;

fn client() -> EventSubClient {
    EventSubClient::with_config("ws://127.0.0.1:1".to_string(), ReconnectConfig::default())
}

fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Clone) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let writer = {
        let log = Arc::clone(&log);
        move |entry: &str| log.lock().unwrap().push(entry.to_string())
    };
    (log, writer)
}

#[test]
fn handlers_run_in_registration_order() {
    let client = client();
    let (log, write) = recorder();

    let w1 = write.clone();
    let _h1 = client.on("connected", move |_| w1("first"));
    let w2 = write.clone();
    let _h2 = client.on("connected", move |_| w2("second"));
    let w3 = write;
    let _h3 = client.on("connected", move |_| w3("third"));

    dispatch(&client.inner, "connected", &Value::Null);

    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn panicking_handler_does_not_break_later_handlers() {
    let client = client();
    let (log, write) = recorder();

    let _h1 = client.on("connected", |_| panic!("boom"));
    let w = write;
    let _h2 = client.on("connected", move |_| w("survived"));

    dispatch(&client.inner, "connected", &Value::Null);
    dispatch(&client.inner, "connected", &Value::Null);

    assert_eq!(*log.lock().unwrap(), vec!["survived", "survived"]);
}

#[test]
fn unsubscribe_handle_removes_exactly_one_handler() {
    let client = client();
    let (log, write) = recorder();

    let w1 = write.clone();
    let h1 = client.on("connected", move |_| w1("a"));
    let w2 = write;
    let _h2 = client.on("connected", move |_| w2("b"));

    h1.unsubscribe();
    dispatch(&client.inner, "connected", &Value::Null);

    assert_eq!(*log.lock().unwrap(), vec!["b"]);
}

#[test]
fn connected_notice_updates_session_and_voids_subscriptions() {
    let client = client();
    client
        .inner
        .subscribed
        .lock()
        .unwrap()
        .insert("channel.chat.message".to_string());

    let (log, write) = recorder();
    let w = write;
    let _h = client.on(EVENT_CONNECTED, move |payload| {
        w(payload.as_str().unwrap_or_default())
    });

    handle_notice(
        &client.inner,
        SessionNotice::Connected {
            session_id: "sess-9".to_string(),
        },
    );

    assert_eq!(client.session_id().as_deref(), Some("sess-9"));
    assert!(client.inner.subscribed.lock().unwrap().is_empty());
    assert_eq!(*log.lock().unwrap(), vec!["sess-9"]);
}

#[test]
fn revocation_frees_the_topic_for_resubscription() {
    let client = client();
    client
        .inner
        .subscribed
        .lock()
        .unwrap()
        .insert("channel.chat.message".to_string());

    handle_notice(
        &client.inner,
        SessionNotice::Revoked {
            envelope: json!({
                "payload": {"subscription": {"type": "channel.chat.message"}}
            }),
        },
    );

    assert!(client.inner.subscribed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn subscribe_before_welcome_is_not_ready() {
    let client = client();
    let result = client
        .subscribe("channel.chat.message", "1", json!({}))
        .await;
    assert!(matches!(result, Err(SubscribeError::NotReady)));
}

#[test]
fn state_listener_observes_changes() {
    let client = client();
    let (log, write) = recorder();
    let w = write;
    client.set_state_listener(move |state| w(&format!("{state:?}")));

    let sink = client.event_sink();
    sink(ClientEvent::StateChanged(ConnectionState::Connecting));
    sink(ClientEvent::StateChanged(ConnectionState::Welcomed));

    assert_eq!(client.state(), ConnectionState::Welcomed);
    assert_eq!(log.lock().unwrap().len(), 2);
}
