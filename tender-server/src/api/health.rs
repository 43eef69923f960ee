//! Health check route
//!
//! Public route, no actor headers required.
//!
//! # Response example
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "epoch": "3d9f...",
//!   "orders": 12
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

/// Health router - public (no identity required)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Status (healthy | degraded)
    status: &'static str,
    /// Server version
    version: &'static str,
    /// Instance ID minted at startup; changes on restart
    epoch: String,
    /// Orders currently in storage
    orders: u64,
}

/// Basic health check
///
/// Reads the order counter as a storage probe; a failing read reports
/// the instance as degraded instead of erroring.
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let (status, orders) = match state.store.order_count() {
        Ok(count) => ("healthy", count),
        Err(e) => {
            tracing::error!(error = %e, "Health probe failed to read storage");
            ("degraded", 0)
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        epoch: state.epoch.clone(),
        orders,
    })
}
