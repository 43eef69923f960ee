//! Router assembly and HTTP middleware stack

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// UUID request IDs for log correlation
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware and no state; tests drive this directly
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Order intake, lifecycle, approval
        .merge(super::orders::router())
        // Offer editing, locks, winner selection
        .merge(super::offers::router())
        // Negotiation threads
        .merge(super::chat::router())
        // Administrative operations
        .merge(super::admin::router())
        // Public health probe
        .merge(super::health::router())
}

/// The served application: routes plus middleware plus state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        // Stamp every request with an ID and echo it on the response
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .with_state(state)
}
