//! Authentication session: the bearer token and the identity it resolves
//! to.
//!
//! The OAuth redirect itself happens outside the app (implicit grant in
//! the browser); this module only captures the token handed back on the
//! redirect URL, resolves it into a user via the identity lookup, and
//! holds the pair for the rest of the page session. Desktop builds can
//! inject a token through `BOTORNOT_ACCESS_TOKEN` instead.

#[cfg(test)]
#[path = "auth_session_test.rs"]
mod auth_session_test;

use botornot_shared::TwitchUser;
use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

use crate::api_client::HelixClient;
use crate::eventsub::Credential;

const SESSION_KEY: &str = "botornot_session";

/// Stored session data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub user: TwitchUser,
}

/// Authentication context provided to the app.
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub session: Signal<Option<AuthSession>>,
    pub auth_error: Signal<Option<String>>,
    pub authenticating: Signal<bool>,
}

/// Provider component that sets up the auth context.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let session = use_signal(|| crate::storage::load::<AuthSession>(SESSION_KEY));
    let auth_error = use_signal(|| None);
    let authenticating = use_signal(|| false);

    let context = AuthContext {
        session,
        auth_error,
        authenticating,
    };
    use_context_provider(|| context);

    // Keep storage in sync with the session.
    use_effect(move || {
        let current = session.cloned();
        if let Some(current) = current.as_ref() {
            crate::storage::save(SESSION_KEY, current);
        } else {
            crate::storage::remove(SESSION_KEY);
        }
    });

    // Pick up a token from the redirect (web) or the environment
    // (desktop) once on mount.
    use_future(move || async move {
        bootstrap(context).await;
    });

    children
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    pub fn user(&self) -> Option<TwitchUser> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.access_token.clone())
    }

    /// The credential handed to the stream client.
    pub fn credential(&self) -> Option<Credential> {
        let client_id = crate::config::client_id()?;
        let session = self.session.read();
        let session = session.as_ref()?;
        Some(Credential {
            client_id,
            access_token: session.access_token.clone(),
            user_id: session.user.id.clone(),
        })
    }

    /// Begin the OAuth implicit grant: redirect on web, print the URL on
    /// desktop.
    pub fn login(&mut self) {
        let Some(client_id) = crate::config::client_id() else {
            self.auth_error
                .set(Some("Client ID is not configured".to_string()));
            return;
        };
        let url = crate::config::authorize_url(&client_id, &crate::config::redirect_uri());

        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(&url);
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            crate::log_info!("open this URL to authorize, then restart with BOTORNOT_ACCESS_TOKEN set: {}", url);
        }
    }

    /// Install an already-resolved token/identity pair.
    pub fn login_with_token(&mut self, access_token: String, user: TwitchUser) {
        self.auth_error.set(None);
        self.session.set(Some(AuthSession { access_token, user }));
    }

    /// Drop the session.
    pub fn logout(&mut self) {
        crate::storage::remove(SESSION_KEY);
        self.session.set(None);
    }
}

/// Resolve a raw bearer token into a full session.
async fn resolve_token(mut context: AuthContext, access_token: String) {
    let Some(client_id) = crate::config::client_id() else {
        context
            .auth_error
            .set(Some("Client ID is not configured".to_string()));
        return;
    };

    context.authenticating.set(true);
    let client = HelixClient::new(client_id, access_token.clone());
    match client.current_user().await {
        Ok(user) => {
            crate::log_info!("authenticated as {}", user.display_name);
            context.login_with_token(access_token, user);
        }
        Err(e) => {
            crate::log_error!("identity lookup failed: {}", e);
            context
                .auth_error
                .set(Some(format!("Failed to look up identity: {}", e.user_message())));
        }
    }
    context.authenticating.set(false);
}

#[cfg(target_arch = "wasm32")]
async fn bootstrap(mut context: AuthContext) {
    let Some(window) = web_sys::window() else {
        return;
    };

    // OAuth errors come back on the query string.
    if let Ok(search) = window.location().search() {
        if let Some(error) = parse_oauth_error(&search) {
            context.auth_error.set(Some(error));
            return;
        }
    }

    let Some(token) = window
        .location()
        .hash()
        .ok()
        .and_then(|hash| parse_fragment_token(&hash))
    else {
        return;
    };

    // Strip the fragment immediately so the token does not stay in the
    // URL (or the browser history).
    if let Ok(history) = window.history() {
        let path = window.location().pathname().unwrap_or_else(|_| "/".to_string());
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&path));
    }

    crate::log_info!("found access token in URL fragment");
    resolve_token(context, token).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn bootstrap(context: AuthContext) {
    if context.session.read().is_some() {
        return;
    }
    let Ok(token) = std::env::var("BOTORNOT_ACCESS_TOKEN") else {
        return;
    };
    if token.trim().is_empty() {
        return;
    }
    crate::log_info!("found access token in environment");
    resolve_token(context, token).await;
}

/// Extract `access_token` from a redirect URL fragment
/// (`#access_token=...&scope=...`).
pub(crate) fn parse_fragment_token(fragment: &str) -> Option<String> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    for pair in fragment.split('&') {
        if let Some(value) = pair.strip_prefix("access_token=") {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Extract a user-facing message from OAuth error query parameters
/// (`?error=access_denied&error_description=...`).
pub(crate) fn parse_oauth_error(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut error = None;
    let mut description = None;
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("error_description=") {
            description = Some(value);
        } else if let Some(value) = pair.strip_prefix("error=") {
            error = Some(value);
        }
    }

    let error = error?;
    match description {
        Some(description) => {
            let description = description.replace('+', " ");
            let description = urlencoding::decode(&description)
                .map(|decoded| decoded.into_owned())
                .unwrap_or(description);
            Some(format!("Authentication error: {error} - {description}"))
        }
        None => Some(format!("Authentication error: {error}")),
    }
}
