//! HTTP-level tests for the REST surface, exercising the router directly
//! via `tower::ServiceExt::oneshot` against in-memory storage — no
//! Postgres, Redis or Kafka required.

use axum::body::Body;
use axum::response::Response;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use wfa_server::{routes, AppState, Config};
use wfa_storage::StorageBackend;
use wfa_types::WorkflowRun;

async fn test_state() -> AppState {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        storage_backend: StorageBackend::InMemory,
        data_dir: "./data".to_string(),
        postgres_host: String::new(),
        postgres_port: String::new(),
        postgres_db: String::new(),
        postgres_user: String::new(),
        postgres_password: String::new(),
        redis_host: "wfa-test-no-such-host".to_string(),
        redis_port: "6379".to_string(),
        default_page_limit: 50,
    };

    let (workflow_storage, run_storage) =
        wfa_storage::StorageFactory::create(StorageBackend::InMemory, None, None)
            .await
            .expect("in-memory storage never fails to initialize");

    AppState::new(&config, workflow_storage, run_storage).await
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is valid JSON")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = routes::build_router(test_state().await);
    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_then_get_workflow_round_trips() {
    let app = routes::build_router(test_state().await);

    let payload = json!({
        "name": "demo",
        "steps": [{"name": "s1", "type": "delay", "config": {"duration": 1}}],
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/workflows", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let workflow_id = created["workflow_id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(get_request(&format!("/api/v1/workflows/{workflow_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["name"], "demo");
    assert_eq!(fetched["uuid"], workflow_id);
}

#[tokio::test]
async fn get_unknown_workflow_is_404() {
    let app = routes::build_router(test_state().await);
    let response = app
        .oneshot(get_request("/api/v1/workflows/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_workflow_with_no_steps_is_422() {
    let app = routes::build_router(test_state().await);
    let payload = json!({"name": "empty", "steps": []});
    let response = app
        .oneshot(json_request("POST", "/api/v1/workflows", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_workflow_with_duplicate_step_names_is_422() {
    let app = routes::build_router(test_state().await);
    let payload = json!({
        "name": "dup",
        "steps": [
            {"name": "s1", "type": "delay", "config": {"duration": 1}},
            {"name": "s1", "type": "delay", "config": {"duration": 2}},
        ],
    });
    let response = app
        .oneshot(json_request("POST", "/api/v1/workflows", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn trigger_unknown_workflow_is_404() {
    let app = routes::build_router(test_state().await);
    let payload = json!({"workflow_id": "missing", "payload": {}});
    let response = app
        .oneshot(json_request("POST", "/api/v1/trigger", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_unknown_run_is_404() {
    let app = routes::build_router(test_state().await);
    let response = app
        .oneshot(get_request("/api/v1/runs/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_runs_paginates_with_cursor() {
    let state = test_state().await;
    for i in 0..5 {
        let run = WorkflowRun::new_pending(format!("wf-{i}"), json!({}));
        state.run_storage.create(run).await.unwrap();
    }
    let app = routes::build_router(state);

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/runs?limit=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    let first_items = page["items"].as_array().unwrap();
    assert_eq!(first_items.len(), 2);
    assert_eq!(page["limit"], 2);
    let cursor = page["next_cursor"].as_str().unwrap().to_string();

    let response = app
        .oneshot(get_request(&format!("/api/v1/runs?limit=2&cursor={cursor}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_runs_limit_is_clamped_to_200() {
    let app = routes::build_router(test_state().await);
    let response = app
        .oneshot(get_request("/api/v1/runs?limit=10000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["limit"], 200);
}
