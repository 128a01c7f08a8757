//! End-to-end tests of the card API driven through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::Router;
use kanban_server::{build_app, AppState, Environment, ErrorTranslator};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const ORIGIN: &str = "http://localhost:5173";

struct TestApp {
    _dir: TempDir,
    app: Router,
}

fn test_app(environment: Environment) -> TestApp {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("kanban.db").display());
    TestApp {
        app: app_for(&url, environment),
        _dir: dir,
    }
}

fn app_for(database_url: &str, environment: Environment) -> Router {
    build_app(AppState::new(
        database_url,
        HeaderValue::from_static(ORIGIN),
        ErrorTranslator::new(environment),
    ))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, title: &str, status: &str) -> Value {
    let (code, body) = send(
        app,
        Method::POST,
        "/api/cards",
        Some(json!({ "title": title, "status": status })),
    )
    .await;
    assert_eq!(code, StatusCode::OK, "create failed: {body}");
    body["data"].clone()
}

#[tokio::test]
async fn health_reports_ok() {
    let test = test_app(Environment::Test);
    let (status, body) = send(&test.app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert!(body["data"]["version"].as_str().is_some());
}

#[tokio::test]
async fn create_assigns_sequential_orders_per_status() {
    let test = test_app(Environment::Test);

    let first = create(&test.app, "Write docs", "TODO").await;
    let second = create(&test.app, "Ship it", "TODO").await;
    let other = create(&test.app, "Review", "DOING").await;

    assert_eq!(first["order"], 1);
    assert_eq!(second["order"], 2);
    assert_eq!(other["order"], 1);
    assert_eq!(first["description"], Value::Null);
    assert_eq!(first["createdAt"], first["updatedAt"]);
    assert!(first["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn list_returns_created_cards_newest_first() {
    let test = test_app(Environment::Test);
    let older = create(&test.app, "older", "TODO").await;
    let newer = create(&test.app, "newer", "DONE").await;

    let (status, body) = send(&test.app, Method::GET, "/api/cards", None).await;
    assert_eq!(status, StatusCode::OK);
    let cards = body["data"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["id"], newer["id"]);
    assert_eq!(cards[1]["id"], older["id"]);
}

#[tokio::test]
async fn update_rewrites_content_and_keeps_placement() {
    let test = test_app(Environment::Test);
    let card = create(&test.app, "draft", "DOING").await;
    let uri = format!("/api/cards/{}", card["id"].as_str().unwrap());

    let (status, body) = send(
        &test.app,
        Method::PATCH,
        &uri,
        Some(json!({ "title": "final", "description": "with notes" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "final");
    assert_eq!(body["data"]["description"], "with notes");
    assert_eq!(body["data"]["status"], "DOING");
    assert_eq!(body["data"]["order"], card["order"]);
    assert_eq!(body["data"]["createdAt"], card["createdAt"]);

    let (status, body) = send(
        &test.app,
        Method::PATCH,
        &uri,
        Some(json!({ "title": "final", "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], Value::Null);
}

#[tokio::test]
async fn reorder_moves_cards_across_statuses() {
    let test = test_app(Environment::Test);
    let a = create(&test.app, "A", "TODO").await;
    let b = create(&test.app, "B", "TODO").await;

    let items = json!([
        { "id": b["id"], "status": "TODO", "order": 1 },
        { "id": a["id"], "status": "DONE", "order": 1 },
    ]);
    let (status, body) = send(
        &test.app,
        Method::PATCH,
        "/api/cards",
        Some(json!({ "items": items })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], items);

    let (_, listed) = send(&test.app, Method::GET, "/api/cards", None).await;
    let cards = listed["data"].as_array().unwrap();
    let find = |id: &Value| cards.iter().find(|card| &card["id"] == id).unwrap().clone();
    assert_eq!(find(&a["id"])["status"], "DONE");
    assert_eq!(find(&a["id"])["order"], 1);
    assert_eq!(find(&b["id"])["order"], 1);
    assert_eq!(find(&a["id"])["title"], "A");
}

#[tokio::test]
async fn reorder_with_unknown_id_changes_nothing() {
    let test = test_app(Environment::Test);
    let a = create(&test.app, "A", "TODO").await;

    let (status, body) = send(
        &test.app,
        Method::PATCH,
        "/api/cards",
        Some(json!({ "items": [
            { "id": a["id"], "status": "DONE", "order": 7 },
            { "id": "missing", "status": "DONE", "order": 8 },
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);

    let (_, listed) = send(&test.app, Method::GET, "/api/cards", None).await;
    assert_eq!(listed["data"][0]["status"], "TODO");
    assert_eq!(listed["data"][0]["order"], 1);
}

#[tokio::test]
async fn delete_is_permanent() {
    let test = test_app(Environment::Test);
    let card = create(&test.app, "gone soon", "DONE").await;
    let uri = format!("/api/cards/{}", card["id"].as_str().unwrap());

    let (status, body) = send(&test.app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], card["id"]);

    let (status, body) = send(&test.app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("card not found: {}", card["id"].as_str().unwrap()));

    let (_, listed) = send(&test.app, Method::GET, "/api/cards", None).await;
    assert!(listed["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_input_is_rejected_before_the_store() {
    let test = test_app(Environment::Production);

    let (status, body) = send(
        &test.app,
        Method::POST,
        "/api/cards",
        Some(json!({ "title": "x".repeat(256), "status": "LATER" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Validation Error: "));
    assert!(message.contains("Title is long"));
    assert!(body["timestamp"].as_i64().is_some());

    let (status, body) = send(
        &test.app,
        Method::PATCH,
        "/api/cards",
        Some(json!({ "items": [{ "id": "a", "status": "TODO", "order": 0 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("items.0.order"));

    let (_, listed) = send(&test.app, Method::GET, "/api/cards", None).await;
    assert!(listed["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let test = test_app(Environment::Test);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cards")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Validation Error: "));
}

#[tokio::test]
async fn update_of_unknown_card_is_not_found() {
    let test = test_app(Environment::Test);
    let (status, body) = send(
        &test.app,
        Method::PATCH,
        "/api/cards/nope",
        Some(json!({ "title": "t", "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "card not found: nope");
}

#[tokio::test]
async fn unknown_route_uses_error_body() {
    let test = test_app(Environment::Test);
    let (status, body) = send(&test.app, Method::GET, "/api/boards", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn database_failures_are_masked_in_production() {
    let dir = TempDir::new().unwrap();
    // A directory cannot be opened as a database file.
    let url = format!("sqlite://{}", dir.path().display());

    let production = app_for(&url, Environment::Production);
    let (status, body) = send(&production, Method::GET, "/api/cards", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], 500);
    assert_eq!(body["message"], "Internal Error");

    let development = app_for(&url, Environment::Development);
    let (status, body) = send(&development, Method::GET, "/api/cards", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Database error: "));
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let test = test_app(Environment::Test);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/cards")
        .header(header::ORIGIN, ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .body(Body::empty())
        .unwrap();

    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        ORIGIN
    );
}

#[tokio::test]
async fn unsupported_method_uses_error_body() {
    let test = test_app(Environment::Test);
    let (status, body) = send(&test.app, Method::PUT, "/api/cards", Some(json!({}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], 405);
    assert_eq!(body["message"], "Method not allowed");
}

#[tokio::test]
async fn undecodable_path_id_is_a_bad_request() {
    let test = test_app(Environment::Test);
    let (status, body) = send(&test.app, Method::DELETE, "/api/cards/%FF", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn reorder_rejects_orders_beyond_32_bits() {
    let test = test_app(Environment::Test);
    let card = create(&test.app, "A", "TODO").await;

    let (status, body) = send(
        &test.app,
        Method::PATCH,
        "/api/cards",
        Some(json!({ "items": [{ "id": card["id"], "status": "DONE", "order": 9007199254740993u64 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("items.0.order: Number must be less than or equal to 2147483647"));

    let (status, body) = send(
        &test.app,
        Method::PATCH,
        "/api/cards",
        Some(json!({ "items": [{ "id": card["id"], "status": "DONE", "order": 2147483647 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["order"], 2147483647);

    let next = create(&test.app, "B", "DONE").await;
    assert_eq!(next["order"], 2147483648i64);
}
