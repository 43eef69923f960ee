//! Offer API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use shared::order::{Offer, OfferDetail, OfferItemDraft, ToggleOutcome, WinnerDraft};

use crate::api::actor::Actor;
use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// The caller's view of an edit lease
#[derive(Debug, Serialize)]
pub struct LockLease {
    pub offer_id: u64,
    pub locked_by: u64,
    pub locked_at: i64,
    pub ttl_secs: u64,
    pub expires_at: i64,
}

impl LockLease {
    fn from_offer(offer: &Offer, ttl_secs: u64) -> Result<Self, AppError> {
        // acquire/renew always return the offer with a live lease
        match (offer.locked_at, offer.locked_by) {
            (Some(locked_at), Some(locked_by)) => Ok(Self {
                offer_id: offer.id,
                locked_by,
                locked_at,
                ttl_secs,
                expires_at: locked_at + (ttl_secs as i64) * 1000,
            }),
            _ => Err(AppError::internal("lease fields missing after acquire")),
        }
    }
}

/// Request body for revising an offer
#[derive(Debug, Deserialize)]
pub struct UpdateOfferRequest {
    pub items: Vec<OfferItemDraft>,
}

/// Save a revised set of quote lines
///
/// Matched lines keep their winner state; saving releases the
/// caller's edit lease.
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateOfferRequest>,
) -> AppResult<Json<AppResponse<OfferDetail>>> {
    let detail = state.bids.update_offer(id, actor.id, payload.items)?;
    Ok(ok(detail))
}

/// Take the edit lease on an offer
pub async fn acquire_lock(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<u64>,
) -> AppResult<Json<AppResponse<LockLease>>> {
    let offer = state.locks.acquire(id, actor.id)?;
    let lease = LockLease::from_offer(&offer, state.config.edit_lock_timeout_secs)?;
    Ok(ok(lease))
}

/// Extend a live lease (heartbeat)
pub async fn renew_lock(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<u64>,
) -> AppResult<Json<AppResponse<LockLease>>> {
    let offer = state.locks.renew(id, actor.id)?;
    let lease = LockLease::from_offer(&offer, state.config.edit_lock_timeout_secs)?;
    Ok(ok(lease))
}

/// Give the lease back without saving
pub async fn release_lock(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<u64>,
) -> AppResult<Json<AppResponse<()>>> {
    state.locks.release(id, actor.id)?;
    Ok(ok(()))
}

/// Request body for the winner toggle
#[derive(Debug, Deserialize)]
pub struct ToggleWinnerRequest {
    pub order_id: u64,
    pub offer_item_id: u64,
    /// Commit price override; quoted price is committed when absent
    pub draft: Option<WinnerDraft>,
}

/// Promote a quote to provisional winner, or reset a current winner
pub async fn toggle_winner(
    State(state): State<ServerState>,
    actor: Actor,
    Json(payload): Json<ToggleWinnerRequest>,
) -> AppResult<Json<AppResponse<ToggleOutcome>>> {
    actor.require_admin()?;
    let outcome = state.ranking.toggle_winner(
        payload.order_id,
        payload.offer_item_id,
        payload.draft,
        actor.id,
    )?;
    Ok(ok(outcome))
}
