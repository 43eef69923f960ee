//! Router extension for in-process calls
//!
//! Lets tests and embedded consumers push one request through the
//! router without a network listener.

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use http::{Request, Response};
use tower::Service;

use crate::core::ServerState;

/// Raw response of an in-process call
pub type OneshotResult = Result<Response<Body>>;

/// Adds an in-process `oneshot` call to the router
///
/// # Example
///
/// ```ignore
/// let state = ServerState::initialize(&config)?;
/// let request = Request::builder()
///     .uri("/api/health")
///     .body(Body::empty())?;
///
/// let response = build_router().oneshot(&state, request).await?;
/// ```
#[async_trait::async_trait]
pub trait OneshotRouter {
    /// Push one request through the router and return the raw response
    async fn oneshot(&mut self, state: &ServerState, request: Request<Body>) -> OneshotResult;
}

#[async_trait::async_trait]
impl OneshotRouter for Router<ServerState> {
    async fn oneshot(&mut self, state: &ServerState, request: Request<Body>) -> OneshotResult {
        // with_state consumes the router, so call through a stateful clone
        let mut service = self.clone().with_state(state.clone());
        Ok(service.call(request).await?)
    }
}
