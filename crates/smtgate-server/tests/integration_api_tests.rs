//! Integration tests for REST API endpoints
//!
//! The router is driven with `tower::ServiceExt::oneshot` over a scripted
//! engine, so these tests need no z3 binary.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use smtgate_core::{MockEngine, MockOutcome, SolveService};
use smtgate_server::api::create_router;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const SAT_X5: &str = "(declare-const x Int)(assert (= x 5))";
const UNSAT_X: &str = "(declare-const x Int)(assert (> x 5))(assert (< x 5))";
const MIXED: &str = "(declare-const i Int)(declare-const b Bool)(declare-const r Real)(declare-const s String)";
const HARD: &str = "(declare-const n Int)(assert (= (* n n n) 33))";
const SLOW: &str = "(declare-const slow Int)";

fn test_engine() -> MockEngine {
    MockEngine::new()
        .with_outcome(SAT_X5, MockOutcome::sat("((define-fun x () Int 5))"))
        .with_outcome(UNSAT_X, MockOutcome::unsat())
        .with_outcome(
            MIXED,
            MockOutcome::sat(
                r#"(
                  (define-fun i () Int (- 7))
                  (define-fun b () Bool true)
                  (define-fun r () Real (/ 1.0 3.0))
                  (define-fun s () String "say ""hi""")
                )"#,
            ),
        )
        .with_outcome(HARD, MockOutcome::unknown())
        .with_outcome(SLOW, MockOutcome::Hang)
}

fn create_test_router(engine: MockEngine) -> Router {
    create_router(SolveService::new(Arc::new(engine), Duration::from_secs(5)))
}

fn solve_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/solve")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = create_test_router(test_engine());
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Z3 Solver API");
    assert_eq!(
        json["usage"],
        "POST to /solve with JSON body: {\"constraint\": \"<Z3 constraint string>\"}"
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router(test_engine());
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_solve_sat() {
    let app = create_test_router(test_engine());
    let (status, json) = send(app, solve_request(json!({ "constraint": SAT_X5 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"check_result": "sat", "model": [{"name": "x", "value": 5}]})
    );
}

#[tokio::test]
async fn test_solve_unsat() {
    let app = create_test_router(test_engine());
    let (status, json) = send(app, solve_request(json!({ "constraint": UNSAT_X }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"check_result": "unsat", "model": null}));
}

#[tokio::test]
async fn test_solve_unknown_is_ok() {
    let app = create_test_router(test_engine());
    let (status, json) = send(app, solve_request(json!({ "constraint": HARD }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"check_result": "unknown", "model": null}));
}

#[tokio::test]
async fn test_solve_normalizes_every_sort() {
    let app = create_test_router(test_engine());
    let (status, json) = send(app, solve_request(json!({ "constraint": MIXED }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "check_result": "sat",
            "model": [
                {"name": "i", "value": -7},
                {"name": "b", "value": true},
                {"name": "r", "value": 0.3333333333},
                {"name": "s", "value": "say \"hi\""}
            ]
        })
    );
}

#[tokio::test]
async fn test_solve_invalid_constraint() {
    let app = create_test_router(test_engine());
    let (status, json) = send(
        app,
        solve_request(json!({ "constraint": "not a valid constraint" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error processing constraint: "));
    assert!(detail.len() > "Error processing constraint: ".len());
}

#[tokio::test]
async fn test_solve_solver_error_is_bad_request() {
    let engine = MockEngine::new().with_outcome(
        SAT_X5,
        MockOutcome::SolverError("out of memory".to_string()),
    );
    let app = create_test_router(engine);
    let (status, json) = send(app, solve_request(json!({ "constraint": SAT_X5 }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["detail"],
        "Error processing constraint: solver error: out of memory"
    );
}

#[tokio::test]
async fn test_solve_empty_constraint() {
    let engine = Arc::new(test_engine());
    let app = create_router(SolveService::new(engine.clone(), Duration::from_secs(5)));
    let (status, json) = send(app, solve_request(json!({ "constraint": "   " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["detail"],
        "Error processing constraint: constraint must not be empty"
    );
    assert_eq!(engine.sessions_opened(), 0);
}

#[tokio::test]
async fn test_solve_missing_constraint_field() {
    let app = create_test_router(test_engine());
    let (status, json) = send(app, solve_request(json!({ "formula": SAT_X5 }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["detail"].as_str().unwrap().contains("constraint"));
}

#[tokio::test]
async fn test_solve_malformed_json() {
    let app = create_test_router(test_engine());
    let request = Request::builder()
        .method("POST")
        .uri("/solve")
        .header("content-type", "application/json")
        .body(Body::from("{\"constraint\": "))
        .unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["detail"].is_string());
}

#[tokio::test]
async fn test_solve_engine_unavailable() {
    let app = create_test_router(MockEngine::unavailable());
    let (status, json) = send(app, solve_request(json!({ "constraint": SAT_X5 }))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .starts_with("Solver unavailable: "));
}

#[tokio::test(start_paused = true)]
async fn test_solve_deadline_answers_unknown() {
    let app = create_router(SolveService::new(
        Arc::new(test_engine()),
        Duration::from_millis(100),
    ));
    let (status, json) = send(app, solve_request(json!({ "constraint": SLOW }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"check_result": "unknown", "model": null}));
}

#[tokio::test]
async fn test_solve_is_idempotent() {
    let engine = Arc::new(test_engine());
    let app = create_router(SolveService::new(engine.clone(), Duration::from_secs(5)));

    let (_, first) = send(app.clone(), solve_request(json!({ "constraint": MIXED }))).await;
    let (_, second) = send(app, solve_request(json!({ "constraint": MIXED }))).await;

    assert_eq!(first, second);
    assert_eq!(engine.sessions_opened(), 2);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_router(test_engine());
    let response = app
        .oneshot(Request::builder().uri("/v1/decide").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_on_solve_is_rejected() {
    let app = create_test_router(test_engine());
    let response = app
        .oneshot(Request::builder().uri("/solve").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
