//! Actor identity extractor
//!
//! Authentication lives upstream; the gateway injects the resolved
//! identity as an `X-Actor-Id` / `X-Actor-Role` header pair. Handlers
//! that need to know who is calling take an [`Actor`] parameter and
//! get a 401 for free when the pair is missing or malformed.

use axum::{extract::FromRequestParts, http::request::Parts};

use shared::chat::ChatRole;
use shared::{ActorRole, AdminCapability};

use crate::utils::AppError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The authenticated party behind a request
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: u64,
    pub role: ActorRole,
}

impl Actor {
    /// Chat identity of this actor (desk roles collapse to admin)
    pub fn chat_role(&self) -> ChatRole {
        self.role.as_chat_role()
    }

    /// Capability token for privileged operations, or 403
    pub fn require_admin(&self) -> Result<AdminCapability, AppError> {
        self.role
            .admin_capability()
            .ok_or_else(|| AppError::forbidden(format!("{} role cannot perform this operation", self.role)))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
        };

        let id = match header(ACTOR_ID_HEADER).and_then(|v| v.trim().parse::<u64>().ok()) {
            Some(id) => id,
            None => {
                tracing::warn!(uri = %parts.uri, "Request without actor identity");
                return Err(AppError::Unauthorized);
            }
        };
        let role = match header(ACTOR_ROLE_HEADER).and_then(ActorRole::parse) {
            Some(role) => role,
            None => {
                tracing::warn!(uri = %parts.uri, actor_id = id, "Request with unknown actor role");
                return Err(AppError::Unauthorized);
            }
        };

        Ok(Actor { id, role })
    }
}
