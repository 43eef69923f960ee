//! Connection settings for the tender server

use shared::ActorRole;

/// Where to reach the server and who is calling
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Actor identity sent as `X-Actor-Id` / `X-Actor-Role`
    pub actor_id: Option<u64>,
    pub actor_role: Option<ActorRole>,

    /// Per-request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            actor_id: None,
            actor_role: None,
            timeout: 30,
        }
    }

    /// Attach an actor identity to every request
    pub fn with_actor(mut self, id: u64, role: ActorRole) -> Self {
        self.actor_id = Some(id);
        self.actor_role = Some(role);
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Build the HTTP transport configured here
    pub fn build_http_client(&self) -> super::HttpClient {
        super::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
