use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use item_api::{create_app, AppState};
use item_core::{ApiConfig, Item, ItemRepository, ITEM_STATUS_PROCESSED};
use item_infrastructure::InMemoryItemRepository;
use item_testing_utils::{numbered_items, MockItemRepository};
use item_worker::WorkerPool;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with(repository: Arc<dyn ItemRepository>) -> Router {
    let pool = Arc::new(WorkerPool::new(2));
    create_app(AppState::new(repository, pool), &ApiConfig::default())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_list_items_empty() {
    let app = app_with(Arc::new(InMemoryItemRepository::new()));

    let response = app.oneshot(empty_request("GET", "/api/items")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_create_item_returns_created() {
    let repository = Arc::new(InMemoryItemRepository::new());
    let app = app_with(repository.clone());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/items",
            json!({"name": "Alpha", "description": "first", "status": "NEW", "email": "a@x.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Alpha");
    assert_eq!(body["status"], "NEW");
    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn test_create_item_validation_errors_as_map() {
    let app = app_with(Arc::new(InMemoryItemRepository::new()));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/items",
            json!({"name": "A", "email": "not-an-email"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({
            "name": "Name must be between 2 and 50 characters",
            "email": "Invalid email format"
        })
    );
}

#[tokio::test]
async fn test_create_item_blank_name() {
    let app = app_with(Arc::new(InMemoryItemRepository::new()));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/items",
            json!({"name": "   ", "email": "a@x.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["name"], "Name cannot be blank");
}

#[tokio::test]
async fn test_create_item_malformed_json() {
    let app = app_with(Arc::new(InMemoryItemRepository::new()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/items")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_item() {
    let repository = Arc::new(InMemoryItemRepository::new());
    repository.upsert(&Item::new("Alpha", "a@x.com")).await.unwrap();
    let app = app_with(repository);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/items/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Alpha");

    let response = app
        .oneshot(empty_request("GET", "/api/items/99"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_update_item_forces_path_id() {
    let repository = Arc::new(InMemoryItemRepository::new());
    repository.upsert(&Item::new("Alpha", "a@x.com")).await.unwrap();
    let app = app_with(repository.clone());

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/items/1",
            json!({"id": 77, "name": "Alpha v2", "email": "a2@x.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Alpha v2");

    assert!(repository.get_by_id(77).await.unwrap().is_none());
    assert_eq!(
        repository.get_by_id(1).await.unwrap().unwrap().email,
        "a2@x.com"
    );
}

#[tokio::test]
async fn test_update_missing_item() {
    let app = app_with(Arc::new(InMemoryItemRepository::new()));

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/items/5",
            json!({"name": "Alpha", "email": "a@x.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(response).await, b"Item not found");
}

#[tokio::test]
async fn test_update_validation_errors_as_list() {
    let repository = Arc::new(InMemoryItemRepository::new());
    repository.upsert(&Item::new("Alpha", "a@x.com")).await.unwrap();
    let app = app_with(repository);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/items/1",
            json!({"name": "", "email": "bad"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!(["email: Invalid email format", "name: Name cannot be blank"])
    );
}

#[tokio::test]
async fn test_delete_item() {
    let repository = Arc::new(InMemoryItemRepository::new());
    repository.upsert(&Item::new("Alpha", "a@x.com")).await.unwrap();
    let app = app_with(repository.clone());

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/api/items/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(repository.is_empty().await);

    let response = app
        .oneshot(empty_request("DELETE", "/api/items/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_process_items_marks_everything_processed() {
    let repository = Arc::new(InMemoryItemRepository::new());
    for item in numbered_items(3) {
        repository.upsert(&item).await.unwrap();
    }
    let app = app_with(repository);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/items/process"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let processed: Vec<Item> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(processed.len(), 3);
    assert!(processed
        .iter()
        .all(|item| item.status.as_deref() == Some(ITEM_STATUS_PROCESSED)));

    let response = app.oneshot(empty_request("GET", "/api/items")).await.unwrap();
    let listed: Vec<Item> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(listed.iter().all(Item::is_processed));
}

#[tokio::test]
async fn test_process_items_skips_failed_records() {
    let repository = MockItemRepository::with_items(numbered_items(4)).fail_upsert_for(2);
    let app = app_with(Arc::new(repository));

    let response = app
        .oneshot(empty_request("GET", "/api/items/process"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let processed: Vec<Item> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(processed.len(), 3);
}

#[tokio::test]
async fn test_process_report_lists_failures() {
    let repository = MockItemRepository::with_items(numbered_items(4)).fail_upsert_for(3);
    let app = app_with(Arc::new(repository));

    let response = app
        .oneshot(empty_request("GET", "/api/items/process/report"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["processed"].as_array().unwrap().len(), 3);
    assert_eq!(report["dispatched"], 4);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["failures"][0]["item_id"], 3);
}

#[tokio::test]
async fn test_snapshot_failure_returns_generic_500() {
    let repository = MockItemRepository::with_items(numbered_items(2)).fail_list_all();
    let app = app_with(Arc::new(repository));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/items/process"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"error": "An unexpected error occurred"})
    );

    let response = app.oneshot(empty_request("GET", "/api/items")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health_check() {
    let app = app_with(Arc::new(InMemoryItemRepository::new()));

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["worker_pool"]["size"], 2);
}

#[tokio::test]
async fn test_metrics_disabled_returns_not_found() {
    let app = app_with(Arc::new(InMemoryItemRepository::new()));

    let response = app.oneshot(empty_request("GET", "/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
