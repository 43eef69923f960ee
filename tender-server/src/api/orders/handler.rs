//! Order API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use shared::order::{
    ApprovalOutcome, Audience, BidBoard, OfferDetail, OfferItemDraft, Order, OrderDetail,
    OrderDraft, OrderItem, OrderItemEdit, OrderMetadataEdit, OrderStatus, SupplierIdent,
};

use crate::api::actor::Actor;
use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Query params for reading one order
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    /// Which projection of the status label to compute
    pub audience: Option<Audience>,
}

/// Order detail plus the status label projected for the audience
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub detail: OrderDetail,
    pub status_label: &'static str,
}

/// Create an order
pub async fn create(
    State(state): State<ServerState>,
    Json(draft): Json<OrderDraft>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let detail = state.orders.create_order(draft)?;
    Ok(ok(detail))
}

/// List orders, newest first (paginated)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = state.orders.list_orders(query.limit, query.offset)?;
    Ok(ok(orders))
}

/// Get one order with items and offers
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Query(query): Query<DetailQuery>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let detail = state.orders.get_order(id)?;
    let audience = query.audience.unwrap_or(Audience::Admin);
    let status_label = detail.order.status_label(audience);
    Ok(ok(OrderView {
        detail,
        status_label,
    }))
}

/// Request body for sparse item edits
#[derive(Debug, Deserialize)]
pub struct UpdateItemsRequest {
    pub items: Vec<OrderItemEdit>,
}

/// Apply sparse edits to requested items
pub async fn update_items(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateItemsRequest>,
) -> AppResult<Json<AppResponse<Vec<OrderItem>>>> {
    let items = state.orders.update_order_items(id, payload.items)?;
    Ok(ok(items))
}

/// Apply sparse edits to order-header contact fields
pub async fn update_metadata(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(edit): Json<OrderMetadataEdit>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.update_order_metadata(id, edit)?;
    Ok(ok(order))
}

/// Advance the order one step along the canonical chain
pub async fn advance(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.lifecycle.advance(id)?;
    Ok(ok(order))
}

/// Request body for the status escape hatch
#[derive(Debug, Deserialize)]
pub struct ForceStatusRequest {
    pub status: OrderStatus,
}

/// Force the order to an arbitrary non-terminal status (back office)
pub async fn force_status(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<u64>,
    Json(payload): Json<ForceStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let capability = actor.require_admin()?;
    let order = state.lifecycle.force_set(id, payload.status, capability)?;
    Ok(ok(order))
}

/// Move the order onto the manual-processing branch
pub async fn mark_manual(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.lifecycle.mark_manual(id)?;
    Ok(ok(order))
}

/// Request body when closing an order early
#[derive(Debug, Deserialize)]
pub struct RefuseRequest {
    pub reason: Option<String>,
}

/// Close the order; the caller's role decides Cancelled vs Refused
pub async fn refuse(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<u64>,
    Json(payload): Json<RefuseRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.lifecycle.refuse(id, payload.reason, actor.role)?;
    Ok(ok(order))
}

/// Request body for approval
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    /// Commit even when some items lack a winner
    #[serde(default)]
    pub explicit_override: bool,
}

/// Commit the proposal
///
/// Full coverage commits and answers 200. Incomplete coverage without
/// the override flag holds the order untouched and answers 409 with
/// the missing item names, so the caller can re-confirm.
pub async fn approve(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<u64>,
    Json(payload): Json<ApproveRequest>,
) -> AppResult<Response> {
    actor.require_admin()?;
    let outcome = state.approval.approve(id, payload.explicit_override)?;
    match &outcome {
        ApprovalOutcome::Committed { .. } => Ok(ok(outcome).into_response()),
        ApprovalOutcome::IncompleteCoverage { .. } => {
            let body = Json(AppResponse {
                code: "E0004".to_string(),
                message: "Approval requires explicit confirmation".to_string(),
                data: Some(outcome),
                trace_id: None,
            });
            Ok((StatusCode::CONFLICT, body).into_response())
        }
    }
}

/// Request body for submitting an offer
#[derive(Debug, Deserialize)]
pub struct SubmitOfferRequest {
    pub supplier: SupplierIdent,
    pub items: Vec<OfferItemDraft>,
}

/// Submit a supplier's quote for this order
pub async fn submit_offer(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(payload): Json<SubmitOfferRequest>,
) -> AppResult<Json<AppResponse<OfferDetail>>> {
    let detail = state.bids.submit_offer(id, payload.supplier, payload.items)?;
    Ok(ok(detail))
}

/// Competitive comparison of every quote for this order
pub async fn bid_board(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> AppResult<Json<AppResponse<BidBoard>>> {
    let board = state.ranking.bid_board(id)?;
    Ok(ok(board))
}
