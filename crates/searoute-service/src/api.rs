//! Route and snap endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::{error, info, warn};

use searoute_lib::{snap, RouteFeature, RouteOutcome};

use crate::middleware::RequestId;
use crate::problem::ProblemDetails;
use crate::request::{RouteRequest, SnapRequest, Validate};
use crate::response::{ServiceResponse, SnapResponse};
use crate::state::AppState;

type ApiResult<T> = Result<ServiceResponse<T>, ProblemDetails>;

fn decode<T>(
    payload: Result<Json<T>, JsonRejection>,
    request_id: &RequestId,
) -> Result<T, ProblemDetails>
where
    T: Validate,
{
    let Json(request) =
        payload.map_err(|r| ProblemDetails::from_json_rejection(&r, request_id.as_str()))?;
    request.validate(request_id.as_str()).map_err(|p| *p)?;
    Ok(request)
}

/// `POST /api/v1/route`
///
/// Always answers with a GeoJSON `Feature`. Without a loaded grid or when no
/// sea route exists the feature is the straight line with `routed: false`.
pub async fn route_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> ApiResult<RouteFeature> {
    let request = decode(payload, &request_id)?;
    let (from, to) = (request.from, request.to);
    let config = request.router_config(state.router_config());

    info!(
        %from,
        %to,
        cost_model = %config.cost_model,
        simplify = %config.simplify,
        "handling route request"
    );

    let router = match state.router(config).await {
        Ok(router) => router,
        Err(e) => {
            warn!(error = %e, "water grid unavailable; answering with a straight line");
            return Ok(ServiceResponse::geojson(RouteFeature::fallback(from, to, None)));
        }
    };

    let outcome = tokio::task::spawn_blocking(move || router.route(from, to))
        .await
        .map_err(|e| {
            error!(error = %e, "route search task failed");
            ProblemDetails::internal_error("route search did not complete", request_id.as_str())
        })?;

    match &outcome {
        RouteOutcome::Found(path) => info!(
            points = path.len(),
            cost = path.cost,
            nodes_expanded = path.nodes_expanded,
            "route computed"
        ),
        RouteOutcome::NoRoute(reason) => {
            info!(%reason, "no sea route; answering with a straight line")
        }
    }

    Ok(ServiceResponse::geojson(RouteFeature::from_outcome(
        from, to, &outcome,
    )))
}

/// `POST /api/v1/snap`
///
/// The input comes back unchanged with `snapped: false` when no water lies
/// within the radius or the grid is unavailable.
pub async fn snap_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<SnapRequest>, JsonRejection>,
) -> ApiResult<SnapResponse> {
    let request = decode(payload, &request_id)?;
    let input = request.coordinate();
    let radius = request
        .max_snap_radius
        .unwrap_or(state.router_config().max_snap_radius);

    let snapped = match state.grid().await {
        Ok(grid) => snap(&grid, input, radius),
        Err(e) => {
            warn!(error = %e, "water grid unavailable; returning the input unchanged");
            None
        }
    };

    info!(%input, radius, snapped = snapped.is_some(), "handled snap request");
    Ok(ServiceResponse::new(SnapResponse::new(input, snapped.as_ref())))
}
