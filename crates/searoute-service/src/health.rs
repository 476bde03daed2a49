//! Liveness and readiness probes.
//!
//! `/health/live` answers as soon as the process serves HTTP. `/health/ready`
//! answers 503 until the water grid has been loaded.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use searoute_lib::WaterGrid;

use crate::AppState;

const SERVICE: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Body of both probe responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` or `"not_ready: <reason>"`.
    pub status: String,
    pub service: String,
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridStatus>,
}

/// Shape of the loaded grid, reported by the readiness probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridStatus {
    pub rows: u32,
    pub cols: u32,
    pub water_cells: usize,
    pub wraps_longitude: bool,
}

impl From<&WaterGrid> for GridStatus {
    fn from(grid: &WaterGrid) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            water_cells: grid.water_count(),
            wraps_longitude: grid.wraps_longitude(),
        }
    }
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            grid: None,
        }
    }

    pub fn ready(service: &str, version: &str, grid: GridStatus) -> Self {
        Self {
            grid: Some(grid),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {reason}"),
            ..Self::alive(service, version)
        }
    }
}

/// `GET /health/live`
pub async fn health_live() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus::alive(SERVICE, VERSION)))
}

/// `GET /health/ready`
///
/// Never triggers a load itself; the binary starts one at boot and route
/// requests retry it.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    match state.store().get() {
        Some(grid) => {
            let status = HealthStatus::ready(SERVICE, VERSION, GridStatus::from(grid.as_ref()));
            (StatusCode::OK, Json(status)).into_response()
        }
        None => {
            let status = HealthStatus::not_ready(SERVICE, VERSION, "water grid not loaded");
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
    }
}
