//! HTTP front end for the sea-route library.
//!
//! - `POST /api/v1/route`: GeoJSON route between two coordinates
//! - `POST /api/v1/snap`: nearest navigable water cell
//! - `GET /health/live`, `GET /health/ready`: probes
//!
//! Handlers stay thin: they validate input, call `searoute-lib`, and shape the
//! answer. Bad input becomes RFC 9457 problem details; a missing grid or an
//! unreachable destination degrades to a straight line instead of an error.

#![deny(warnings)]

mod api;
pub mod config;
mod health;
pub mod logging;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use api::{route_handler, snap_handler};
pub use config::{ConfigError, ServiceConfig};
pub use health::{health_live, health_ready, GridStatus, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use middleware::{extract_or_generate_request_id, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    ProblemDetails, PROBLEM_CONTENT_TYPE, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_COORDINATE,
    PROBLEM_INVALID_REQUEST,
};
pub use request::{RouteRequest, SnapRequest, Validate, MAX_SNAP_RADIUS_LIMIT};
pub use response::{ServiceResponse, SnapResponse, GEOJSON_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use state::AppState;

/// The full HTTP application over `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/route", post(route_handler))
        .route("/api/v1/snap", post(snap_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(axum::middleware::from_fn(middleware::propagate_request_id))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::request_span))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
