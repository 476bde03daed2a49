//! Request bodies and their validation.

use serde::{Deserialize, Serialize};

use searoute_lib::{CostModel, GeoCoordinate, RouterConfig, SimplifyMode};

use crate::ProblemDetails;

/// Upper bound on per-request snap radius overrides.
pub const MAX_SNAP_RADIUS_LIMIT: u32 = 256;

/// Checks a decoded body before any grid work happens.
pub trait Validate {
    /// Boxed so the `Err` variant stays small.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// `POST /api/v1/route`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub from: GeoCoordinate,
    pub to: GeoCoordinate,

    /// Overrides the service default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_model: Option<CostModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplify: Option<SimplifyMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_snap_radius: Option<u32>,
}

impl RouteRequest {
    pub fn new(from: GeoCoordinate, to: GeoCoordinate) -> Self {
        Self {
            from,
            to,
            cost_model: None,
            simplify: None,
            max_snap_radius: None,
        }
    }

    /// `defaults` with this request's overrides applied.
    pub fn router_config(&self, defaults: &RouterConfig) -> RouterConfig {
        RouterConfig {
            cost_model: self.cost_model.unwrap_or(defaults.cost_model),
            simplify: self.simplify.unwrap_or(defaults.simplify),
            max_snap_radius: self.max_snap_radius.unwrap_or(defaults.max_snap_radius),
            ..defaults.clone()
        }
    }
}

impl Validate for RouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        check_coordinate("from", &self.from, request_id)?;
        check_coordinate("to", &self.to, request_id)?;
        check_radius(self.max_snap_radius, request_id)
    }
}

/// `POST /api/v1/snap`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapRequest {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_snap_radius: Option<u32>,
}

impl SnapRequest {
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.lat, self.lon)
    }
}

impl Validate for SnapRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        check_coordinate("", &self.coordinate(), request_id)?;
        check_radius(self.max_snap_radius, request_id)
    }
}

fn check_coordinate(
    field: &str,
    coord: &GeoCoordinate,
    request_id: &str,
) -> Result<(), Box<ProblemDetails>> {
    let prefix = if field.is_empty() {
        String::new()
    } else {
        format!("{field}.")
    };

    if !coord.lat.is_finite() || !(-90.0..=90.0).contains(&coord.lat) {
        return Err(Box::new(ProblemDetails::invalid_coordinate(
            format!("'{prefix}lat' must be within [-90, 90], got {}", coord.lat),
            request_id,
        )));
    }
    if !coord.lon.is_finite() || !(-180.0..=180.0).contains(&coord.lon) {
        return Err(Box::new(ProblemDetails::invalid_coordinate(
            format!("'{prefix}lon' must be within [-180, 180], got {}", coord.lon),
            request_id,
        )));
    }
    Ok(())
}

fn check_radius(radius: Option<u32>, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    match radius {
        Some(r) if r > MAX_SNAP_RADIUS_LIMIT => Err(Box::new(ProblemDetails::bad_request(
            format!("'max_snap_radius' must be at most {MAX_SNAP_RADIUS_LIMIT}, got {r}"),
            request_id,
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{PROBLEM_INVALID_COORDINATE, PROBLEM_INVALID_REQUEST};

    #[test]
    fn valid_route_passes() {
        let request = RouteRequest::new(
            GeoCoordinate::new(51.5, -0.1),
            GeoCoordinate::new(40.7, -74.0),
        );
        assert!(request.validate("req").is_ok());
    }

    #[test]
    fn out_of_range_latitude_names_the_field() {
        let request =
            RouteRequest::new(GeoCoordinate::new(0.0, 0.0), GeoCoordinate::new(91.0, 0.0));
        let problem = request.validate("req-7").unwrap_err();
        assert_eq!(problem.type_uri, PROBLEM_INVALID_COORDINATE);
        assert_eq!(problem.status, 400);
        assert!(problem.detail.as_deref().unwrap().contains("'to.lat'"));
        assert_eq!(problem.instance.as_deref(), Some("req-7"));
    }

    #[test]
    fn out_of_range_longitude_is_rejected() {
        let request = SnapRequest {
            lat: 0.0,
            lon: -180.5,
            max_snap_radius: None,
        };
        let problem = request.validate("req").unwrap_err();
        assert!(problem.detail.as_deref().unwrap().contains("'lon'"));
    }

    #[test]
    fn oversized_radius_is_a_bad_request() {
        let request = SnapRequest {
            lat: 0.0,
            lon: 0.0,
            max_snap_radius: Some(MAX_SNAP_RADIUS_LIMIT + 1),
        };
        let problem = request.validate("req").unwrap_err();
        assert_eq!(problem.type_uri, PROBLEM_INVALID_REQUEST);
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut request =
            RouteRequest::new(GeoCoordinate::new(0.0, 0.0), GeoCoordinate::new(1.0, 1.0));
        request.cost_model = Some(CostModel::Grid);
        request.max_snap_radius = Some(2);

        let defaults = RouterConfig {
            max_expansions: Some(500),
            ..RouterConfig::default()
        };
        let config = request.router_config(&defaults);
        assert_eq!(config.cost_model, CostModel::Grid);
        assert_eq!(config.max_snap_radius, 2);
        assert_eq!(config.simplify, defaults.simplify);
        assert_eq!(config.max_expansions, Some(500));
    }

    #[test]
    fn route_request_deserializes_nested_coordinates() {
        let json = r#"{"from":{"lat":1.5,"lon":2.5},"to":{"lat":-3,"lon":4},"simplify":"off"}"#;
        let request: RouteRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.from, GeoCoordinate::new(1.5, 2.5));
        assert_eq!(request.simplify, Some(SimplifyMode::Off));
        assert!(request.cost_model.is_none());
    }
}
