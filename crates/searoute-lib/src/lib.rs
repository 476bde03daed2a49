//! Sea-route library entry points.
//!
//! This crate loads a packaged water/land grid, snaps coordinates onto
//! navigable water, and finds 8-connected sea routes with A*. Higher-level
//! consumers (CLI, HTTP service) should only depend on the items exported here
//! instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod error;
pub mod feature;
pub mod geo;
pub mod grid;
pub mod mask;
pub mod router;
pub mod search;
pub mod simplify;
pub mod snap;
pub mod source;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use error::{Error, Result};
pub use feature::RouteFeature;
pub use geo::{haversine_km, GeoCoordinate, ParseCoordinateError};
pub use grid::{GridCell, GridGeometry, WaterGrid};
pub use mask::{decode_mask, encode_mask, load_mask_file, save_mask_file, MaskFormat};
pub use router::{straight_line, RouteOutcome, RoutePath, RouterConfig, SeaRouter};
pub use search::{find_cell_path, CellPath, CostModel, NoRouteReason, SearchOptions, SearchOutcome};
pub use simplify::SimplifyMode;
pub use snap::{snap, snap_to_water, Snapped, DEFAULT_MAX_SNAP_RADIUS};
pub use source::{resolve_mask_location, GridSource, MaskSource};
pub use store::{GridLoadError, WaterGridStore};
