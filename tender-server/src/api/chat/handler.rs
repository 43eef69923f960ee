//! Chat API handlers
//!
//! Sender identity travels in the message payload because the desk
//! bot relays buyer messages on their behalf; reader identity comes
//! from the actor headers because read receipts and thread lists are
//! always about the caller.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use shared::chat::{ChatMessage, SendMessage, ThreadSummary};

use crate::api::actor::Actor;
use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

/// Post a message into a thread, reviving it if archived
pub async fn send(
    State(state): State<ServerState>,
    Json(input): Json<SendMessage>,
) -> AppResult<Json<AppResponse<ChatMessage>>> {
    let message = state.chat.send(input)?;
    Ok(ok(message))
}

/// Query params addressing one thread
#[derive(Debug, Deserialize)]
pub struct ThreadQuery {
    pub order_id: u64,
    pub counterparty_id: u64,
}

/// Full message history of one thread, oldest first
pub async fn messages(
    State(state): State<ServerState>,
    Query(query): Query<ThreadQuery>,
) -> AppResult<Json<AppResponse<Vec<ChatMessage>>>> {
    let messages = state.chat.messages(query.order_id, query.counterparty_id)?;
    Ok(ok(messages))
}

/// Request body for read receipts
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub order_id: u64,
    pub counterparty_id: u64,
}

/// Mark the thread's messages directed at the caller as read
pub async fn mark_read(
    State(state): State<ServerState>,
    actor: Actor,
    Json(payload): Json<MarkReadRequest>,
) -> AppResult<Json<AppResponse<u64>>> {
    let changed = state
        .chat
        .mark_read(payload.order_id, payload.counterparty_id, actor.id)?;
    Ok(ok(changed))
}

/// Query params for the thread list
#[derive(Debug, Deserialize)]
pub struct ThreadListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// Threads visible to the caller, unread first
pub async fn threads(
    State(state): State<ServerState>,
    actor: Actor,
    Query(query): Query<ThreadListQuery>,
) -> AppResult<Json<AppResponse<Vec<ThreadSummary>>>> {
    let threads = state
        .chat
        .list_threads(actor.id, actor.chat_role(), query.include_archived)?;
    Ok(ok(threads))
}

/// Request body for archiving or reviving a thread
#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    pub order_id: u64,
    pub counterparty_id: u64,
    pub archived: bool,
}

/// Archive or revive a whole thread
pub async fn archive(
    State(state): State<ServerState>,
    Json(payload): Json<ArchiveRequest>,
) -> AppResult<Json<AppResponse<u64>>> {
    let changed = state.chat.archive_thread(
        payload.order_id,
        payload.counterparty_id,
        payload.archived,
    )?;
    Ok(ok(changed))
}

/// Unread messages addressed to the caller across live threads
///
/// Best effort: storage trouble degrades to zero instead of failing
/// the badge.
pub async fn unread(
    State(state): State<ServerState>,
    actor: Actor,
) -> AppResult<Json<AppResponse<u64>>> {
    Ok(ok(state.chat.unread_total(actor.id)))
}
