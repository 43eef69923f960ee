//! HTTP surface tests driven through the router in-process
//!
//! Uses the oneshot extension instead of a network listener, so the
//! route wiring, extractors and response envelope are exercised
//! exactly as a remote caller would see them.

use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use shared::order::{Currency, OfferItemDraft, OrderDraft, OrderItemDraft, SupplierIdent};
use tender_server::api::{OneshotRouter, build_router};
use tender_server::{Config, ServerState};

fn scratch_state() -> (tempfile::TempDir, ServerState) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config).unwrap();
    (dir, state)
}

async fn call(state: &ServerState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router().oneshot(state, request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send_json(
    method: &str,
    uri: &str,
    actor: Option<(u64, &str)>,
    body: Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some((id, role)) = actor {
        builder = builder
            .header("x-actor-id", id.to_string())
            .header("x-actor-role", role);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn order_body(items: &[&str]) -> Value {
    json!({
        "buyer_id": 500,
        "buyer_name": "Volga Motors",
        "items": items
            .iter()
            .map(|name| json!({ "name": name, "quantity": 4 }))
            .collect::<Vec<_>>(),
    })
}

#[tokio::test]
async fn test_health_is_public_and_reports_storage() {
    let (_dir, state) = scratch_state();

    let (status, body) = call(&state, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["orders"], 0);
    assert_eq!(body["epoch"], state.epoch.as_str());
}

#[tokio::test]
async fn test_create_then_read_order_with_audience_labels() {
    let (_dir, state) = scratch_state();

    let (status, body) = call(
        &state,
        send_json("POST", "/api/orders", None, order_body(&["Brake Pads"])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    assert_eq!(body["data"]["order"]["id"], 1);
    assert_eq!(body["data"]["order"]["status"], "PROCESSING");

    // Same order, three projections of one canonical status
    let (_, admin) = call(&state, get("/api/orders/1")).await;
    assert_eq!(admin["data"]["status_label"], "Processing");
    let (_, buyer) = call(&state, get("/api/orders/1?audience=BUYER")).await;
    assert_eq!(buyer["data"]["status_label"], "Processing");
    let (_, supplier) = call(&state, get("/api/orders/1?audience=SUPPLIER")).await;
    assert_eq!(supplier["data"]["status_label"], "New request");
}

#[tokio::test]
async fn test_unknown_order_maps_to_404_envelope() {
    let (_dir, state) = scratch_state();

    let (status, body) = call(&state, get("/api/orders/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
}

#[tokio::test]
async fn test_force_status_requires_admin_identity() {
    let (_dir, state) = scratch_state();
    call(
        &state,
        send_json("POST", "/api/orders", None, order_body(&["Brake Pads"])),
    )
    .await;

    let target = json!({ "status": "READY_TO_BUY" });

    // No identity headers at all
    let (status, body) = call(
        &state,
        send_json("PUT", "/api/orders/1/status", None, target.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    // A buyer is authenticated but not allowed
    let (status, body) = call(
        &state,
        send_json(
            "PUT",
            "/api/orders/1/status",
            Some((500, "BUYER")),
            target.clone(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");

    // The back office can jump the chain
    let (status, body) = call(
        &state,
        send_json("PUT", "/api/orders/1/status", Some((9, "ADMIN")), target),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "READY_TO_BUY");
}

#[tokio::test]
async fn test_approve_answers_409_until_confirmed() {
    let (_dir, state) = scratch_state();

    // Two items, a winner on only one of them
    let detail = state
        .orders
        .create_order(OrderDraft {
            buyer_id: 500,
            buyer_name: "Volga Motors".to_string(),
            buyer_phone: None,
            buyer_email: None,
            location: None,
            deadline: None,
            items: ["Item1", "Item2"]
                .iter()
                .map(|name| OrderItemDraft {
                    name: name.to_string(),
                    quantity: 1,
                    brand: None,
                    article: None,
                    uom: None,
                    comment: None,
                })
                .collect(),
        })
        .unwrap();
    let offer = state
        .bids
        .submit_offer(
            detail.order.id,
            SupplierIdent {
                id: 701,
                name: "AutoParts LLC".to_string(),
                phone: None,
            },
            vec![OfferItemDraft {
                order_item_id: Some(detail.items[0].id),
                name: "Item1".to_string(),
                offered_quantity: 1,
                price: "150".parse().unwrap(),
                currency: Currency::Rub,
                weight_kg: 1.0,
                delivery_days: 5,
                supplier_sku: None,
                comment: None,
            }],
        )
        .unwrap();
    state
        .ranking
        .toggle_winner(detail.order.id, offer.items[0].id, None, 9)
        .unwrap();

    let uri = format!("/api/orders/{}/approve", detail.order.id);

    // Held: warning payload, not an error body
    let (status, body) = call(
        &state,
        send_json("POST", &uri, Some((9, "ADMIN")), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");
    assert_eq!(body["data"]["outcome"], "INCOMPLETE_COVERAGE");
    assert_eq!(body["data"]["missing"], json!(["Item2"]));

    // Confirmed: the override commits
    let (status, body) = call(
        &state,
        send_json(
            "POST",
            &uri,
            Some((9, "ADMIN")),
            json!({ "explicit_override": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    assert_eq!(body["data"]["outcome"], "COMMITTED");
    assert_eq!(body["data"]["winners"], 1);
}

#[tokio::test]
async fn test_lock_contention_maps_to_423() {
    let (_dir, state) = scratch_state();

    call(
        &state,
        send_json("POST", "/api/orders", None, order_body(&["Brake Pads"])),
    )
    .await;
    let offer = state
        .bids
        .submit_offer(
            1,
            SupplierIdent {
                id: 701,
                name: "AutoParts LLC".to_string(),
                phone: None,
            },
            vec![OfferItemDraft {
                order_item_id: None,
                name: "Brake Pads".to_string(),
                offered_quantity: 4,
                price: "300".parse().unwrap(),
                currency: Currency::Rub,
                weight_kg: 2.0,
                delivery_days: 3,
                supplier_sku: None,
                comment: None,
            }],
        )
        .unwrap();
    let uri = format!("/api/offers/{}/lock", offer.offer.id);

    // First supplier takes the lease
    let (status, body) = call(
        &state,
        send_json("POST", &uri, Some((701, "SUPPLIER")), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["locked_by"], 701);
    assert_eq!(
        body["data"]["ttl_secs"],
        state.config.edit_lock_timeout_secs
    );

    // A rival supplier bounces off it
    let (status, body) = call(
        &state,
        send_json("POST", &uri, Some((702, "SUPPLIER")), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(body["code"], "E0007");

    // The holder releases; the rival can now take it
    let release = Request::builder()
        .method("DELETE")
        .uri(&uri)
        .header("x-actor-id", "701")
        .header("x-actor-role", "SUPPLIER")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&state, release).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &state,
        send_json("POST", &uri, Some((702, "SUPPLIER")), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["locked_by"], 702);
}
