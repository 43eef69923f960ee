//! Offer API module
//!
//! Supplier-side offer editing behind the edit lease, plus the
//! admin-side winner toggle.

mod handler;

use axum::{
    Router,
    routing::{post, put},
};

use crate::core::ServerState;

/// Offer router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/offers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Winner selection (admin)
        .route("/winner", post(handler::toggle_winner))
        // Offer revision (holder of the edit lease)
        .route("/{id}", put(handler::update))
        // Edit lease lifecycle
        .route(
            "/{id}/lock",
            post(handler::acquire_lock).delete(handler::release_lock),
        )
        .route("/{id}/lock/renew", post(handler::renew_lock))
}
