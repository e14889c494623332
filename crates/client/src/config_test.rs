use super::*;

#[test]
fn authorize_url_encodes_redirect_and_scope() {
    let url = authorize_url("abc123", "http://localhost:5174/");
    assert!(url.starts_with("https://id.twitch.tv/oauth2/authorize?client_id=abc123"));
    assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5174%2F"));
    assert!(url.contains("response_type=token"));
    assert!(url.contains("scope=user%3Aread%3Achat"));
}

#[test]
fn endpoint_defaults_point_at_twitch() {
    // No overrides are configured in the test environment.
    assert!(helix_base_url().starts_with("https://api.twitch.tv"));
    assert!(eventsub_ws_url().starts_with("wss://eventsub.wss.twitch.tv"));
}
