//! End-to-end tests of the HTTP application against the fixture masks.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use http::{HeaderName, HeaderValue};
use serde_json::{json, Value};

use searoute_lib::{load_mask_file, RouterConfig, WaterGrid};
use searoute_service::{app, AppState, GEOJSON_CONTENT_TYPE, PROBLEM_CONTENT_TYPE};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .join(name)
}

fn server(state: AppState) -> TestServer {
    TestServer::new(app(state)).expect("build test server")
}

/// 10x10 strait; the only gap in the land column is on the top row.
fn strait_server() -> TestServer {
    let grid = load_mask_file(&fixture("strait_mask.json")).expect("load strait fixture");
    server(AppState::with_grid(Arc::new(grid), RouterConfig::default()))
}

fn unloaded_server() -> TestServer {
    let missing = fixture("does_not_exist.bin");
    server(AppState::open(
        missing.to_str().expect("utf-8 path"),
        RouterConfig::default(),
    ))
}

fn coordinates(body: &Value) -> Vec<[f64; 2]> {
    body["geometry"]["coordinates"]
        .as_array()
        .expect("coordinates array")
        .iter()
        .map(|c| [c[0].as_f64().unwrap(), c[1].as_f64().unwrap()])
        .collect()
}

#[tokio::test]
async fn route_goes_through_the_strait() {
    let server = strait_server();
    let response = server
        .post("/api/v1/route")
        .json(&json!({
            "from": {"lat": 0.5, "lon": 0.5},
            "to": {"lat": 0.5, "lon": 9.5},
            "simplify": "off"
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), GEOJSON_CONTENT_TYPE);

    let body: Value = response.json();
    assert_eq!(body["type"], "Feature");
    assert_eq!(body["geometry"]["type"], "LineString");
    assert_eq!(body["properties"]["routed"], true);
    assert!(body["properties"]["cost"].as_f64().unwrap() > 0.0);

    let coords = coordinates(&body);
    assert_eq!(coords.first(), Some(&[0.5, 0.5]));
    assert_eq!(coords.last(), Some(&[9.5, 0.5]));
    assert!(coords.contains(&[5.5, 9.5]), "route must use the gap at row 0");
    assert_eq!(
        body["properties"]["points"].as_u64(),
        Some(coords.len() as u64)
    );
}

#[tokio::test]
async fn per_request_overrides_are_honoured() {
    let server = strait_server();
    let simplified: Value = server
        .post("/api/v1/route")
        .json(&json!({
            "from": {"lat": 0.5, "lon": 0.5},
            "to": {"lat": 0.5, "lon": 9.5},
            "cost_model": "grid",
            "simplify": "line-of-sight"
        }))
        .await
        .json();
    let full: Value = server
        .post("/api/v1/route")
        .json(&json!({
            "from": {"lat": 0.5, "lon": 0.5},
            "to": {"lat": 0.5, "lon": 9.5},
            "cost_model": "grid",
            "simplify": "off"
        }))
        .await
        .json();

    assert!(coordinates(&simplified).len() < coordinates(&full).len());
    let optimal = 9.0 + 9.0 * std::f64::consts::SQRT_2;
    let cost = full["properties"]["cost"].as_f64().unwrap();
    assert!((cost - optimal).abs() < 1e-9, "cost {cost}");
}

#[tokio::test]
async fn disconnected_basins_fall_back_with_a_reason() {
    let grid = WaterGrid::from_ascii(
        5.0,
        0.0,
        1.0,
        "~~#~~\n~~#~~\n~~#~~\n~~#~~\n~~#~~",
    )
    .expect("valid grid");
    let server = server(AppState::with_grid(Arc::new(grid), RouterConfig::default()));

    let response = server
        .post("/api/v1/route")
        .json(&json!({"from": {"lat": 2.5, "lon": 0.5}, "to": {"lat": 2.5, "lon": 4.5}}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["properties"]["routed"], false);
    assert_eq!(body["properties"]["reason"], "disconnected");
    assert_eq!(coordinates(&body), vec![[0.5, 2.5], [4.5, 2.5]]);
}

#[tokio::test]
async fn missing_grid_degrades_to_straight_line() {
    let server = unloaded_server();
    let response = server
        .post("/api/v1/route")
        .json(&json!({"from": {"lat": 10.0, "lon": -20.0}, "to": {"lat": 12.0, "lon": -18.0}}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["properties"]["routed"], false);
    assert!(body["properties"].get("reason").is_none());
    assert_eq!(coordinates(&body), vec![[-20.0, 10.0], [-18.0, 12.0]]);
}

#[tokio::test]
async fn invalid_coordinate_is_a_problem_document() {
    let server = strait_server();
    let response = server
        .post("/api/v1/route")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-invalid"),
        )
        .json(&json!({"from": {"lat": 91.0, "lon": 0.0}, "to": {"lat": 0.5, "lon": 9.5}}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.header("content-type"), PROBLEM_CONTENT_TYPE);
    let problem: Value = response.json();
    assert_eq!(problem["type"], "/problems/invalid-coordinate");
    assert_eq!(problem["status"], 400);
    assert_eq!(problem["instance"], "req-invalid");
    assert!(problem["detail"].as_str().unwrap().contains("from.lat"));
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let server = strait_server();
    let response = server
        .post("/api/v1/route")
        .json(&json!({"from": {"lat": 0.5, "lon": 0.5}}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let problem: Value = response.json();
    assert_eq!(problem["type"], "/problems/invalid-request");
    assert!(problem["instance"].is_string());
}

#[tokio::test]
async fn snap_moves_a_land_point_onto_water() {
    let server = strait_server();
    let response = server
        .post("/api/v1/snap")
        .json(&json!({"lat": 5.5, "lon": 5.2}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["snapped"], true);
    assert_eq!(body["radius"], 1);
    assert_eq!(body["cell"], json!([4, 4]));
    assert_eq!(body["coordinate"], json!({"lat": 5.5, "lon": 4.5}));
    assert_eq!(body["input"], json!({"lat": 5.5, "lon": 5.2}));
}

#[tokio::test]
async fn snap_without_grid_returns_the_input() {
    let server = unloaded_server();
    let body: Value = server
        .post("/api/v1/snap")
        .json(&json!({"lat": 1.25, "lon": 2.5}))
        .await
        .json();

    assert_eq!(body["snapped"], false);
    assert_eq!(body["coordinate"], json!({"lat": 1.25, "lon": 2.5}));
    assert!(body.get("radius").is_none());
}

#[tokio::test]
async fn liveness_is_always_ok() {
    unloaded_server().get("/health/live").await.assert_status_ok();
}

#[tokio::test]
async fn readiness_follows_the_grid() {
    let ready = strait_server().get("/health/ready").await;
    ready.assert_status_ok();
    let body: Value = ready.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["grid"]["rows"], 10);
    assert_eq!(body["grid"]["water_cells"], 91);

    let not_ready = unloaded_server().get("/health/ready").await;
    not_ready.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = not_ready.json();
    assert!(body["status"].as_str().unwrap().starts_with("not_ready"));
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let server = strait_server();

    let echoed = server
        .get("/health/live")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("abc-123"),
        )
        .await;
    assert_eq!(echoed.header("x-request-id"), "abc-123");

    let generated = server.get("/health/live").await;
    let id = generated.header("x-request-id");
    assert_eq!(id.to_str().unwrap().len(), 36);
}
