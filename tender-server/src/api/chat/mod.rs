//! Chat API module
//!
//! Per-order negotiation threads between the sourcing desk and one
//! counterparty.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Chat router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/chat", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/messages", post(handler::send).get(handler::messages))
        .route("/read", post(handler::mark_read))
        .route("/threads", get(handler::threads))
        .route("/archive", post(handler::archive))
        .route("/unread", get(handler::unread))
}
