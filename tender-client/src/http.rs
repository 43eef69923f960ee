//! REST transport for the tender server
//!
//! Every response travels in the server's envelope (`code`, `message`,
//! `data`); the verbs below unwrap it and map error statuses onto
//! [`ClientError`].

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{ClientConfig, ClientError, ClientResult};
use shared::ActorRole;

/// Server response envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    pub message: String,
    pub data: Option<T>,
    pub trace_id: Option<String>,
}

/// HTTP client for making network requests to the tender server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    actor_id: Option<u64>,
    actor_role: Option<ActorRole>,
}

impl HttpClient {
    /// Build the transport from a [`ClientConfig`]
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.clone(),
            actor_id: config.actor_id,
            actor_role: config.actor_role,
        }
    }

    /// Set the actor identity attached to every request
    pub fn with_actor(mut self, id: u64, role: ActorRole) -> Self {
        self.actor_id = Some(id);
        self.actor_role = Some(role);
        self
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn apply_identity(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (self.actor_id, self.actor_role) {
            (Some(id), Some(role)) => request
                .header("x-actor-id", id.to_string())
                .header("x-actor-role", role.to_string()),
            _ => request,
        }
    }

    /// GET a payload
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.apply_identity(self.client.get(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// POST a JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.apply_identity(self.client.post(self.url(path)).json(body));
        Self::handle_response(request.send().await?).await
    }

    /// POST with an empty body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.apply_identity(self.client.post(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// PUT a JSON body
    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.apply_identity(self.client.put(self.url(path)).json(body));
        Self::handle_response(request.send().await?).await
    }

    /// Make a DELETE request, discarding the (unit) payload
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let request = self.apply_identity(self.client.delete(self.url(path)));
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response.text().await?));
        }
        Ok(())
    }

    /// Unwrap the envelope or map the error status
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::status_error(status, text));
        }

        let envelope: Envelope<T> = response.json().await?;
        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("missing data field".to_string()))
    }

    fn status_error(status: StatusCode, body: String) -> ClientError {
        // Prefer the envelope message when the body parses as one
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .map(|envelope| envelope.message)
            .unwrap_or(body);
        tracing::warn!(%status, %message, "Server rejected request");

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::LOCKED => ClientError::Locked(message),
            StatusCode::UNPROCESSABLE_ENTITY => ClientError::BusinessRule(message),
            _ => ClientError::Internal(message),
        }
    }
}
