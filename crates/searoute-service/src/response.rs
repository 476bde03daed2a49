//! Successful response bodies.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use searoute_lib::{GeoCoordinate, Snapped};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";

/// Payload plus the media type it is served as.
///
/// The payload's fields are flattened so a GeoJSON `Feature` stays a valid
/// feature; `content_type` is only used for the header.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(skip)]
    pub content_type: &'static str,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: JSON_CONTENT_TYPE,
        }
    }

    pub fn geojson(data: T) -> Self {
        Self {
            data,
            content_type: GEOJSON_CONTENT_TYPE,
        }
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        let content_type = self.content_type;
        let mut response = (StatusCode::OK, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type),
        );
        response
    }
}

/// Body of `POST /api/v1/snap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapResponse {
    pub input: GeoCoordinate,
    /// Snapped cell centre, or `input` when no water was found.
    pub coordinate: GeoCoordinate,
    pub snapped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    /// `[row, col]` of the chosen cell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<[u32; 2]>,
}

impl SnapResponse {
    pub fn new(input: GeoCoordinate, snapped: Option<&Snapped>) -> Self {
        Self {
            input,
            coordinate: snapped.map_or(input, |s| s.coordinate),
            snapped: snapped.is_some(),
            radius: snapped.map(|s| s.radius),
            cell: snapped.map(|s| [s.cell.row, s.cell.col]),
        }
    }
}
