//! GeoJSON rendering of route outcomes.
//!
//! A found route becomes a `LineString` over the route points; a failed one
//! becomes the two-point straight-line fallback with `routed: false`.

use serde::{Deserialize, Serialize};

use crate::geo::GeoCoordinate;
use crate::router::{straight_line, RouteOutcome};
use crate::search::NoRouteReason;

/// GeoJSON `Feature` wrapping a route line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFeature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: LineString,
    pub properties: RouteProperties,
}

/// GeoJSON `LineString`; coordinates are `[lon, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteProperties {
    /// `false` when the geometry is the straight-line fallback.
    pub routed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoRouteReason>,
    pub points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_expanded: Option<usize>,
}

impl RouteFeature {
    pub fn from_outcome(from: GeoCoordinate, to: GeoCoordinate, outcome: &RouteOutcome) -> Self {
        match outcome {
            RouteOutcome::Found(path) => Self::line(
                path.lon_lat_pairs(),
                RouteProperties {
                    routed: true,
                    reason: None,
                    points: path.len(),
                    cost: Some(path.cost),
                    length_km: Some(path.length_km()),
                    nodes_expanded: Some(path.nodes_expanded),
                },
            ),
            RouteOutcome::NoRoute(reason) => Self::fallback(from, to, Some(*reason)),
        }
    }

    /// Straight line between the raw inputs. `reason` is `None` when routing
    /// was not attempted (e.g. the grid is unavailable).
    pub fn fallback(from: GeoCoordinate, to: GeoCoordinate, reason: Option<NoRouteReason>) -> Self {
        let coordinates: Vec<[f64; 2]> = straight_line(from, to)
            .into_iter()
            .map(GeoCoordinate::to_lon_lat)
            .collect();
        let points = coordinates.len();
        Self::line(
            coordinates,
            RouteProperties {
                routed: false,
                reason,
                points,
                cost: None,
                length_km: Some(from.distance_km(&to)),
                nodes_expanded: None,
            },
        )
    }

    fn line(coordinates: Vec<[f64; 2]>, properties: RouteProperties) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: LineString {
                kind: "LineString".to_string(),
                coordinates,
            },
            properties,
        }
    }
}
