//! Client configuration: Twitch application id and provider endpoints.
//!
//! The client id is baked in at compile time when
//! `BOTORNOT_TWITCH_CLIENT_ID` is set in the build environment; it can be
//! overridden at runtime through the storage layer (both platforms) or a
//! process environment variable (desktop). Endpoint URLs have production
//! defaults and runtime overrides so tests and local mock servers can
//! redirect the client.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

const DEFAULT_HELIX_BASE: &str = "https://api.twitch.tv/helix";
const DEFAULT_EVENTSUB_WS: &str = "wss://eventsub.wss.twitch.tv/ws";
const DEFAULT_AUTHORIZE_URL: &str = "https://id.twitch.tv/oauth2/authorize";

/// OAuth scope required to read the broadcaster's own chat.
pub const OAUTH_SCOPE: &str = "user:read:chat";

const CLIENT_ID_KEY: &str = "botornot_client_id";

/// The Twitch application client id, if configured.
pub fn client_id() -> Option<String> {
    if let Some(stored) = crate::storage::load::<String>(CLIENT_ID_KEY) {
        if !stored.trim().is_empty() {
            return Some(stored);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    if let Ok(from_env) = std::env::var("BOTORNOT_TWITCH_CLIENT_ID") {
        if !from_env.trim().is_empty() {
            return Some(from_env);
        }
    }

    option_env!("BOTORNOT_TWITCH_CLIENT_ID")
        .map(str::to_string)
        .filter(|id| !id.trim().is_empty())
}

/// Persist a client id override.
pub fn set_client_id(id: &str) {
    crate::storage::save(CLIENT_ID_KEY, &id.to_string());
}

/// Base URL for Helix REST calls.
pub fn helix_base_url() -> String {
    override_or("botornot_helix_base", "BOTORNOT_HELIX_BASE", DEFAULT_HELIX_BASE)
}

/// URL of the EventSub WebSocket endpoint.
pub fn eventsub_ws_url() -> String {
    override_or("botornot_eventsub_ws", "BOTORNOT_EVENTSUB_WS", DEFAULT_EVENTSUB_WS)
}

/// Build the OAuth implicit-grant authorize URL for the given redirect URI.
pub fn authorize_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=token&scope={}",
        DEFAULT_AUTHORIZE_URL,
        client_id,
        urlencoding::encode(redirect_uri),
        urlencoding::encode(OAUTH_SCOPE),
    )
}

/// The redirect URI handed to the authorize endpoint: the page origin on
/// web, a registered loopback address on desktop.
pub fn redirect_uri() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            if let Ok(origin) = window.location().origin() {
                return format!("{}/", origin.trim_end_matches('/'));
            }
        }
    }
    "http://localhost:5174/".to_string()
}

fn override_or(storage_key: &str, env_key: &str, default: &str) -> String {
    if let Some(stored) = crate::storage::load::<String>(storage_key) {
        if !stored.trim().is_empty() {
            return stored;
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    if let Ok(from_env) = std::env::var(env_key) {
        if !from_env.trim().is_empty() {
            return from_env;
        }
    }
    #[cfg(target_arch = "wasm32")]
    let _ = env_key;

    default.to_string()
}
