use super::*;

fn envelope(message_type: &str, extra_metadata: &str, payload: &str) -> String {
    format!(
        r#"{{
            "metadata": {{
                "message_id": "msg-1",
                "message_type": "{message_type}",
                "message_timestamp": "2024-01-10T10:11:12.123Z"{extra_metadata}
            }},
            "payload": {payload}
        }}"#
    )
}

#[test]
fn parses_session_welcome() {
    let text = envelope(
        "session_welcome",
        "",
        r#"{"session": {"id": "sess-abc", "status": "connected", "keepalive_timeout_seconds": 10}}"#,
    );

    let frame = InboundFrame::parse(&text).expect("welcome frame");
    match frame {
        InboundFrame::Welcome(session) => {
            assert_eq!(session.id, "sess-abc");
            assert_eq!(session.keepalive_timeout_seconds, Some(10));
            assert_eq!(session.reconnect_url, None);
        }
        other => panic!("expected welcome, got {other:?}"),
    }
}

#[test]
fn parses_session_keepalive_with_empty_payload() {
    let text = envelope("session_keepalive", "", "{}");
    assert!(matches!(
        InboundFrame::parse(&text).unwrap(),
        InboundFrame::Keepalive
    ));
}

#[test]
fn parses_notification_and_keeps_envelope() {
    let text = envelope(
        "notification",
        r#", "subscription_type": "channel.chat.message", "subscription_version": "1""#,
        r#"{"subscription": {"type": "channel.chat.message"}, "event": {"message_id": "m1"}}"#,
    );

    let frame = InboundFrame::parse(&text).unwrap();
    match frame {
        InboundFrame::Notification {
            subscription_type,
            envelope,
        } => {
            assert_eq!(subscription_type, "channel.chat.message");
            let event = notification_event(&envelope).expect("event");
            assert_eq!(event["message_id"], "m1");
            let sub = notification_subscription(&envelope).expect("subscription");
            assert_eq!(sub["type"], "channel.chat.message");
        }
        other => panic!("expected notification, got {other:?}"),
    }
}

#[test]
fn parses_session_reconnect_with_url() {
    let text = envelope(
        "session_reconnect",
        "",
        r#"{"session": {"id": "sess-abc", "status": "reconnecting", "reconnect_url": "wss://example.test/ws?id=2"}}"#,
    );

    match InboundFrame::parse(&text).unwrap() {
        InboundFrame::Reconnect(session) => {
            assert_eq!(session.reconnect_url.as_deref(), Some("wss://example.test/ws?id=2"));
            assert_eq!(session.keepalive_timeout_seconds, None);
        }
        other => panic!("expected reconnect, got {other:?}"),
    }
}

#[test]
fn parses_revocation() {
    let text = envelope(
        "revocation",
        r#", "subscription_type": "channel.chat.message""#,
        r#"{"subscription": {"type": "channel.chat.message", "status": "authorization_revoked"}}"#,
    );

    match InboundFrame::parse(&text).unwrap() {
        InboundFrame::Revocation {
            subscription_type, ..
        } => assert_eq!(subscription_type, "channel.chat.message"),
        other => panic!("expected revocation, got {other:?}"),
    }
}

#[test]
fn unknown_message_type_is_not_an_error() {
    let text = envelope("session_party", "", "{}");
    match InboundFrame::parse(&text).unwrap() {
        InboundFrame::Unknown { message_type } => assert_eq!(message_type, "session_party"),
        other => panic!("expected unknown, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_an_error() {
    assert!(InboundFrame::parse("{not json").is_err());
    assert!(InboundFrame::parse(r#"{"payload": {}}"#).is_err());
}
