//! Order API module
//!
//! Intake, reading, lifecycle and approval of orders, plus the
//! per-order offer intake and bid comparison views.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Intake and reading
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/items", put(handler::update_items))
        .route("/{id}/metadata", put(handler::update_metadata))
        // Lifecycle
        .route("/{id}/advance", post(handler::advance))
        .route("/{id}/status", put(handler::force_status))
        .route("/{id}/manual", post(handler::mark_manual))
        .route("/{id}/refuse", post(handler::refuse))
        .route("/{id}/approve", post(handler::approve))
        // Bidding views scoped to one order
        .route("/{id}/offers", post(handler::submit_offer))
        .route("/{id}/bid-board", get(handler::bid_board))
}
