/// Router-level tests for the quotation webhook API.
/// Drives the full axum router in-process with `oneshot`; no socket is bound.
use axum::body::{to_bytes, Body};
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use quotation_webhook::config::Config;
use quotation_webhook::handlers::AppState;
use quotation_webhook::routes::build_router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

/// Helper function to create a test app with rate limiting disabled
fn test_app() -> Router {
    let config = Config {
        rate_limit_per_second: 0,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config).unwrap());
    build_router(state)
        .unwrap()
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn post_json(app: &Router, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/quotations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, request).await;
    (status, String::from_utf8(bytes).unwrap())
}

fn quotation(id: Value, customer: &str, total: f64) -> Value {
    json!({
        "id": id,
        "customer_name": customer,
        "items": [{"name": "Widget", "quantity": 2, "unit_price": 5}],
        "total_amount": total
    })
}

#[tokio::test]
async fn test_ingest_then_replace_same_id() {
    let app = test_app();

    // Example 1
    let (status, body) = post_json(&app, &quotation(json!("Q1"), "Acme", 10.0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["id"], "Q1");
    assert!(body["message"].as_str().unwrap().contains("Q1"));

    let (_, listing) = get_json(&app, "/api/quotations").await;
    assert_eq!(listing["total_count"], 1);
    let first_received = listing["quotations"][0]["received_at"]
        .as_str()
        .unwrap()
        .to_string();

    // Example 2
    let (status, _) = post_json(&app, &quotation(json!("Q1"), "Acme", 20.0)).await;
    assert_eq!(status, StatusCode::OK);

    // Example 4
    let (status, listing) = get_json(&app, "/api/quotations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total_count"], 1);
    let stored = &listing["quotations"][0];
    assert_eq!(stored["id"], "Q1");
    assert_eq!(stored["total_amount"], 20.0);
    assert_eq!(stored["received_from_ip"], "127.0.0.1");
    assert!(stored["received_at"].as_str().unwrap() >= first_received.as_str());

    // Example 5
    let (status, health) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["quotations_count"], 1);
    assert!(health["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_replace_keeps_original_position() {
    let app = test_app();
    post_json(&app, &quotation(json!("A"), "Acme", 1.0)).await;
    post_json(&app, &quotation(json!("B"), "Bolt", 2.0)).await;
    post_json(&app, &quotation(json!("A"), "Acme", 3.0)).await;

    let (_, listing) = get_json(&app, "/api/quotations").await;
    assert_eq!(listing["total_count"], 2);
    assert_eq!(listing["quotations"][0]["id"], "A");
    assert_eq!(listing["quotations"][0]["total_amount"], 3.0);
    assert_eq!(listing["quotations"][1]["id"], "B");
}

#[tokio::test]
async fn test_extra_fields_are_preserved() {
    let app = test_app();
    let mut payload = quotation(json!(77), "Acme", 5.0);
    payload["currency"] = json!("EUR");
    payload["notes"] = json!({"priority": "high"});

    let (status, body) = post_json(&app, &payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 77);

    let (_, listing) = get_json(&app, "/api/quotations").await;
    assert_eq!(listing["quotations"][0]["currency"], "EUR");
    assert_eq!(listing["quotations"][0]["notes"]["priority"], "high");
}

#[tokio::test]
async fn test_missing_id_is_rejected_without_mutation() {
    let app = test_app();

    // Example 3
    let (status, body) = post_json(
        &app,
        &json!({"customer_name": "Acme", "items": [], "total_amount": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["message"], "Missing required fields: id");

    let (_, health) = get_json(&app, "/health").await;
    assert_eq!(health["quotations_count"], 0);
}

#[tokio::test]
async fn test_item_errors_name_the_index() {
    let app = test_app();
    let payload = json!({
        "id": "Q9",
        "customer_name": "Acme",
        "items": [
            {"name": "Widget", "quantity": 1, "unit_price": 1},
            {"name": "Gadget"}
        ],
        "total_amount": 2
    });

    let (status, body) = post_json(&app, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Item at index 1 is missing required fields: quantity, unit_price"
    );
}

#[tokio::test]
async fn test_non_json_content_type_is_rejected() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/quotations")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(quotation(json!("Q1"), "Acme", 10.0).to_string()))
        .unwrap();

    let (status, bytes) = send(&app, request).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid content type");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/quotations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"id\": \"Q1\", "))
        .unwrap();

    let (status, bytes) = send(&app, request).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_non_object_payload_is_rejected() {
    let app = test_app();
    let (status, body) = post_json(&app, &json!([1, 2, 3])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid data format: expected JSON object");
}

#[tokio::test]
async fn test_forwarded_for_header_sets_origin() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/quotations")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::from(quotation(json!("Q1"), "Acme", 10.0).to_string()))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = get_json(&app, "/api/quotations").await;
    assert_eq!(listing["quotations"][0]["received_from_ip"], "203.0.113.9");
}

#[tokio::test]
async fn test_listing_view_filters_case_insensitively() {
    let app = test_app();
    post_json(&app, &quotation(json!("Q-ALICE"), "alice corp", 10.0)).await;
    post_json(&app, &quotation(json!("Q-BOB"), "Bob Ltd", 20.0)).await;

    let (status, html) = get_text(&app, "/?search=ALICE").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Q-ALICE"));
    assert!(!html.contains("Q-BOB"));
    assert!(html.contains("Showing 1 of 2 quotations"));

    let (_, html) = get_text(&app, "/?search=q-&customer=bob").await;
    assert!(html.contains("Q-BOB"));
    assert!(!html.contains("Q-ALICE"));

    let (_, html) = get_text(&app, "/?customer=nobody").await;
    assert!(html.contains("No quotations found."));
    assert!(html.contains("Showing 0 of 2 quotations"));
}

#[tokio::test]
async fn test_listing_view_orders_newest_first() {
    let app = test_app();
    post_json(&app, &quotation(json!("OLDER"), "Acme", 1.0)).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    post_json(&app, &quotation(json!("NEWER"), "Acme", 2.0)).await;

    let (_, html) = get_text(&app, "/").await;
    let newer = html.find("NEWER").unwrap();
    let older = html.find("OLDER").unwrap();
    assert!(newer < older);
}

#[tokio::test]
async fn test_listing_view_escapes_customer_names() {
    let app = test_app();
    post_json(
        &app,
        &quotation(json!("Q1"), "<script>alert(1)</script>", 1.0),
    )
    .await;

    let (_, html) = get_text(&app, "/").await;
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_documentation_endpoints() {
    let app = test_app();

    let (status, html) = get_text(&app, "/api/documentation").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("/api/documentation/openapi.json"));

    let (status, doc) = get_json(&app, "/api/documentation/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/webhook/quotations"]["post"].is_object());
    assert!(doc["paths"]["/health"]["get"].is_object());
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = Config {
        rate_limit_per_second: 0,
        max_body_bytes: 64,
        ..Config::default()
    };
    let app = build_router(Arc::new(AppState::new(config).unwrap())).unwrap();

    let mut payload = quotation(json!("Q1"), "Acme", 10.0);
    payload["notes"] = json!("x".repeat(256));
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/quotations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Payload too large");

    let (_, health) = get_json(&app, "/health").await;
    assert_eq!(health["quotations_count"], 0);
}

fn ingest_from(client: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook/quotations")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_ingest_is_rate_limited_per_client() {
    let config = Config {
        rate_limit_per_second: 1,
        rate_limit_burst: 2,
        ..Config::default()
    };
    let app = build_router(Arc::new(AppState::new(config).unwrap())).unwrap();
    let payload = quotation(json!("Q1"), "Acme", 10.0);

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let (status, _) = send(&app, ingest_from("203.0.113.7", &payload)).await;
        statuses.push(status);
    }
    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );

    let (status, bytes) = send(&app, ingest_from("203.0.113.7", &payload)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Too many requests");

    // Another client has its own budget.
    let (status, _) = send(&app, ingest_from("198.51.100.4", &payload)).await;
    assert_eq!(status, StatusCode::OK);

    // Read-only routes are never limited.
    for _ in 0..5 {
        let (status, _) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let (status, list) = get_json(&app, "/api/quotations").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total_count"], 1);
    }
}

#[tokio::test]
async fn test_listing_page_ships_its_script() {
    let app = test_app();
    post_json(&app, &quotation(json!("Q1"), "Acme", 10.0)).await;

    let (status, html) = get_text(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"<script src="/static/app.js"></script>"#));
    assert!(html.contains(r#"id="auto-refresh""#));
    assert!(html.contains(r#"class="status-indicator""#));
    for column in ["id", "customer", "items", "total", "received", "origin"] {
        assert!(html.contains(&format!(r#"th data-sort="{}""#, column)));
        assert!(html.contains(&format!("<td data-{}", column)));
    }
    assert!(html.contains(r#"data-amount="10.00""#));

    let request = Request::builder()
        .uri("/static/app.js")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let script = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(script.contains("th[data-sort]"));
    assert!(script.contains("/health"));
}
