//! Coordinate-level routing: snap both endpoints, search the grid, simplify.
//!
//! [`SeaRouter`] is the entry point; [`RouteOutcome::NoRoute`] carries the
//! reason when no sea path exists.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::geo::{haversine_km, GeoCoordinate};
use crate::grid::{GridCell, WaterGrid};
use crate::search::{find_cell_path, CostModel, NoRouteReason, SearchOptions, SearchOutcome};
use crate::simplify::{simplify, SimplifyMode};
use crate::snap::{snap, Snapped, DEFAULT_MAX_SNAP_RADIUS};

/// Tunables shared by every route computed with one [`SeaRouter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub max_snap_radius: u32,
    /// Snap endpoints onto water before searching; when off, endpoints must
    /// already sit on navigable cells.
    pub snap_endpoints: bool,
    pub cost_model: CostModel,
    pub simplify: SimplifyMode,
    pub max_expansions: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub block_corner_cutting: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_snap_radius: DEFAULT_MAX_SNAP_RADIUS,
            snap_endpoints: true,
            cost_model: CostModel::default(),
            simplify: SimplifyMode::default(),
            max_expansions: None,
            timeout_ms: None,
            block_corner_cutting: false,
        }
    }
}

impl RouterConfig {
    fn search_options(&self) -> SearchOptions {
        SearchOptions {
            cost_model: self.cost_model,
            max_expansions: self.max_expansions,
            timeout: self.timeout_ms.map(Duration::from_millis),
            block_corner_cutting: self.block_corner_cutting,
        }
    }
}

/// A computed sea route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePath {
    /// Cell centres along the route, after simplification.
    pub points: Vec<GeoCoordinate>,
    /// Cells the points were taken from.
    pub cells: Vec<GridCell>,
    /// Search cost of the unsimplified path, in the units of the cost model.
    pub cost: f64,
    pub nodes_expanded: usize,
}

impl RoutePath {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Great-circle length of the polyline.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_km(pair[0], pair[1]))
            .sum()
    }

    /// `[lon, lat]` pairs in GeoJSON order.
    pub fn lon_lat_pairs(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.to_lon_lat()).collect()
    }
}

/// Outcome of [`SeaRouter::route`]. An unreachable goal is a value, not an
/// error.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(RoutePath),
    NoRoute(NoRouteReason),
}

impl RouteOutcome {
    pub fn into_path(self) -> Option<RoutePath> {
        match self {
            RouteOutcome::Found(path) => Some(path),
            RouteOutcome::NoRoute(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RouteOutcome::Found(_))
    }

    pub fn reason(&self) -> Option<NoRouteReason> {
        match self {
            RouteOutcome::Found(_) => None,
            RouteOutcome::NoRoute(reason) => Some(*reason),
        }
    }
}

/// Sea routing over one immutable water grid.
///
/// Cheap to clone; the grid is shared.
#[derive(Debug, Clone)]
pub struct SeaRouter {
    grid: Arc<WaterGrid>,
    config: RouterConfig,
}

impl SeaRouter {
    pub fn new(grid: Arc<WaterGrid>, config: RouterConfig) -> Self {
        Self { grid, config }
    }

    pub fn grid(&self) -> &Arc<WaterGrid> {
        &self.grid
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn snap(&self, coord: GeoCoordinate) -> Option<Snapped> {
        snap(&self.grid, coord, self.config.max_snap_radius)
    }

    /// Nearest water coordinate, or `coord` itself when nothing is in reach.
    pub fn snap_to_water(&self, coord: GeoCoordinate) -> GeoCoordinate {
        self.snap(coord).map(|s| s.coordinate).unwrap_or(coord)
    }

    /// Route between two coordinates over water.
    pub fn route(&self, from: GeoCoordinate, to: GeoCoordinate) -> RouteOutcome {
        let started = Instant::now();

        let start = match self.endpoint(
            from,
            NoRouteReason::StartOutOfGrid,
            NoRouteReason::StartOnLand,
        ) {
            Ok(cell) => cell,
            Err(reason) => return self.no_route(from, to, reason),
        };
        let goal = match self.endpoint(
            to,
            NoRouteReason::GoalOutOfGrid,
            NoRouteReason::GoalOnLand,
        ) {
            Ok(cell) => cell,
            Err(reason) => return self.no_route(from, to, reason),
        };
        if start == goal {
            return self.within_cell(from, to, start);
        }

        let path = match find_cell_path(&self.grid, start, goal, &self.config.search_options()) {
            SearchOutcome::Found(path) => path,
            SearchOutcome::NoRoute { reason, .. } => return self.no_route(from, to, reason),
        };

        let cost = path.cost();
        let nodes_expanded = path.nodes_expanded;
        let cells = simplify(&self.grid, &path.cells, self.config.simplify);
        let points: Vec<GeoCoordinate> =
            cells.iter().map(|&cell| self.grid.unproject(cell)).collect();

        info!(
            %from,
            %to,
            grid_cells = path.cells.len(),
            points = cells.len(),
            cost,
            nodes_expanded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sea route computed"
        );

        RouteOutcome::Found(RoutePath {
            points,
            cells,
            cost,
            nodes_expanded,
        })
    }

    /// Convenience wrapper returning only the path.
    pub fn find_sea_route(&self, from: GeoCoordinate, to: GeoCoordinate) -> Option<RoutePath> {
        self.route(from, to).into_path()
    }

    fn endpoint(
        &self,
        coord: GeoCoordinate,
        outside: NoRouteReason,
        on_land: NoRouteReason,
    ) -> Result<GridCell, NoRouteReason> {
        if self.config.snap_endpoints {
            return self.snap(coord).map(|s| s.cell).ok_or(on_land);
        }
        match self.grid.project(coord) {
            Some(cell) if self.grid.is_navigable(cell) => Ok(cell),
            Some(_) => Err(on_land),
            None => Err(outside),
        }
    }

    /// Both endpoints resolved to `cell`. A cell is convex, so the segment
    /// between the two in-cell points stays on water.
    fn within_cell(&self, from: GeoCoordinate, to: GeoCoordinate, cell: GridCell) -> RouteOutcome {
        let a = self.point_in(from, cell);
        let b = self.point_in(to, cell);
        if a == b {
            return self.no_route(from, to, NoRouteReason::SameCell);
        }
        debug!(%from, %to, %cell, "route stays within one cell");
        RouteOutcome::Found(RoutePath {
            points: vec![a, b],
            cells: vec![cell, cell],
            cost: 0.0,
            nodes_expanded: 0,
        })
    }

    /// `coord` itself when it lies in `cell`, otherwise the cell centre.
    fn point_in(&self, coord: GeoCoordinate, cell: GridCell) -> GeoCoordinate {
        if self.grid.project(coord) == Some(cell) {
            coord
        } else {
            self.grid.unproject(cell)
        }
    }

    fn no_route(
        &self,
        from: GeoCoordinate,
        to: GeoCoordinate,
        reason: NoRouteReason,
    ) -> RouteOutcome {
        debug!(%from, %to, %reason, "no sea route");
        RouteOutcome::NoRoute(reason)
    }
}

/// Two-point fallback for callers that draw something when routing fails.
pub fn straight_line(from: GeoCoordinate, to: GeoCoordinate) -> Vec<GeoCoordinate> {
    vec![from, to]
}
