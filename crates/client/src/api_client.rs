//! HTTP client for the Helix REST API.
//!
//! Two endpoints are used: the user-info lookup that resolves the bearer
//! token into an identity, and the EventSub subscription registration that
//! binds a (type, version, condition) tuple to the live WebSocket session.
//! Non-2xx responses surface as [`ApiError::Http`] with the status
//! attached; nothing here retries.

use botornot_shared::{
    ApiError, CreateSubscriptionRequest, CreateSubscriptionResponse, SubscriptionRecord,
    TwitchUser, UsersResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Client for authenticated Helix calls.
#[derive(Debug, Clone)]
pub struct HelixClient {
    client: Client,
    base_url: String,
    client_id: String,
    bearer_token: String,
}

impl HelixClient {
    pub fn new(client_id: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: crate::config::helix_base_url(),
            client_id: client_id.into(),
            bearer_token: bearer_token.into(),
        }
    }

    /// Point the client at a different Helix base URL (mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    async fn get_json<TRes: DeserializeOwned>(&self, path: &str) -> Result<TRes, ApiError> {
        let resp = self
            .client
            .get(self.url(path))
            .header("Client-Id", &self.client_id)
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let is_success = resp.status().is_success();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read body: {e}")))?;

        if !is_success {
            return Err(ApiError::Http { status, body: text });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Deserialize(e.to_string()))
    }

    async fn post_json<TReq: Serialize, TRes: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TRes, ApiError> {
        let resp = self
            .client
            .post(self.url(path))
            .header("Client-Id", &self.client_id)
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let is_success = resp.status().is_success();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read body: {e}")))?;

        if !is_success {
            return Err(ApiError::Http { status, body: text });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Deserialize(e.to_string()))
    }

    /// Resolve the bearer token into the authenticated user.
    pub async fn current_user(&self) -> Result<TwitchUser, ApiError> {
        let resp: UsersResponse = self.get_json("/users").await?;
        resp.data
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Deserialize("user lookup returned no records".to_string()))
    }

    /// Register an EventSub subscription against a live WebSocket session.
    pub async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<SubscriptionRecord, ApiError> {
        let resp: CreateSubscriptionResponse =
            self.post_json("/eventsub/subscriptions", request).await?;
        resp.data.into_iter().next().ok_or_else(|| {
            ApiError::Deserialize("subscription create returned no records".to_string())
        })
    }
}
