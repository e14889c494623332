use super::*;

#[test]
fn chat_message_event_deserializes_with_fragments() {
    let json = r##"{
        "broadcaster_user_id": "100",
        "broadcaster_user_name": "streamer",
        "chatter_user_id": "200",
        "chatter_user_name": "viewer",
        "message_id": "m-1",
        "message": {
            "text": "hello Kappa @streamer",
            "fragments": [
                {"type": "text", "text": "hello "},
                {"type": "emote", "text": "Kappa", "emote": {"id": "25", "emote_set_id": "0", "format": ["static"]}},
                {"type": "text", "text": " "},
                {"type": "mention", "text": "@streamer", "mention": {"user_id": "100", "user_login": "streamer", "user_name": "streamer"}}
            ]
        },
        "color": "#9146FF"
    }"##;

    let event: ChannelChatMessageEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event.message.fragments.len(), 4);
    assert_eq!(event.message.fragments[1].kind, FragmentKind::Emote);
    assert_eq!(
        event.message.fragments[1].emote.as_ref().unwrap().id,
        "25"
    );
    assert_eq!(event.message.fragments[3].kind, FragmentKind::Mention);

    let message: ChatMessage = event.into();
    assert_eq!(message.id, "m-1");
    assert_eq!(message.chatter_name, "viewer");
    assert!(!message.is_deleted);
}

#[test]
fn chat_message_event_tolerates_missing_fragments_and_color() {
    let json = r#"{
        "broadcaster_user_id": "100",
        "broadcaster_user_name": "streamer",
        "chatter_user_id": "200",
        "chatter_user_name": "viewer",
        "message_id": "m-2",
        "message": {"text": "plain"}
    }"#;

    let event: ChannelChatMessageEvent = serde_json::from_str(json).unwrap();
    assert!(event.message.fragments.is_empty());
    assert_eq!(event.color, None);
}

#[test]
fn delete_event_deserializes() {
    let json = r#"{
        "broadcaster_user_id": "100",
        "target_user_id": "200",
        "target_user_name": "viewer",
        "message_id": "m-1"
    }"#;

    let event: ChannelChatDeleteEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event.message_id, "m-1");
}

#[test]
fn cheermote_fragment_roundtrips_kind_tag() {
    let fragment = MessageFragment {
        kind: FragmentKind::Cheermote,
        text: "Cheer100".to_string(),
        emote: None,
        mention: None,
        cheermote: Some(CheermoteFragment {
            prefix: "Cheer".to_string(),
            bits: 100,
            tier: 1,
        }),
    };

    let json = serde_json::to_value(&fragment).unwrap();
    assert_eq!(json["type"], "cheermote");
    let back: MessageFragment = serde_json::from_value(json).unwrap();
    assert_eq!(back, fragment);
}
