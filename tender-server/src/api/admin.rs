//! Administrative API
//!
//! Destructive maintenance operations, gated on the admin capability.

use axum::{Json, Router, extract::State, routing::delete};

use crate::api::actor::Actor;
use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

/// Admin router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/admin/orders", delete(reset_orders))
}

/// Wipe every order, offer and message from storage
pub async fn reset_orders(
    State(state): State<ServerState>,
    actor: Actor,
) -> AppResult<Json<AppResponse<()>>> {
    let _capability = actor.require_admin()?;
    state.store.wipe_all()?;
    tracing::warn!(actor_id = actor.id, role = %actor.role, "All market data wiped");
    Ok(ok(()))
}
