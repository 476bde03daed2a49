//! Move a coordinate onto the nearest navigable cell.
//!
//! The search visits square rings of growing Chebyshev radius around the cell
//! containing the coordinate. Within the first ring holding any water, the
//! cell whose centre is closest (Euclidean, in cell units) to the exact
//! position wins; equal distances go to the lowest `(row, col)`.

use serde::Serialize;
use tracing::trace;

use crate::geo::GeoCoordinate;
use crate::grid::{GridCell, WaterGrid};

/// Default ring radius searched before giving up.
pub const DEFAULT_MAX_SNAP_RADIUS: u32 = 10;

/// Where a coordinate was snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapped {
    /// Centre of the chosen cell.
    pub coordinate: GeoCoordinate,
    pub cell: GridCell,
    /// Ring the cell was found in; `0` means the input was already on water.
    pub radius: u32,
}

/// Nearest water cell within `max_radius` rings, or `None` if there is none.
///
/// Coordinates outside the grid start from the closest edge cell.
pub fn snap(grid: &WaterGrid, coord: GeoCoordinate, max_radius: u32) -> Option<Snapped> {
    if grid.is_empty() || !coord.lat.is_finite() || !coord.lon.is_finite() {
        return None;
    }

    let origin = grid.project_clamped(coord);
    let (frac_row, frac_col) = grid.fractional_position(coord);
    let row_extent = origin.row.max(grid.rows() - 1 - origin.row);
    let col_extent = if grid.wraps_longitude() {
        grid.cols() / 2
    } else {
        origin.col.max(grid.cols() - 1 - origin.col)
    };

    for radius in 0..=max_radius {
        if radius > row_extent && radius > col_extent {
            break;
        }

        let mut best: Option<(f64, GridCell)> = None;
        for cell in ring(grid, origin, radius) {
            if !grid.is_navigable(cell) {
                continue;
            }
            let distance = centre_distance_sq(grid, cell, frac_row, frac_col);
            let better = match best {
                None => true,
                Some((best_distance, best_cell)) => {
                    distance < best_distance || (distance == best_distance && cell < best_cell)
                }
            };
            if better {
                best = Some((distance, cell));
            }
        }

        if let Some((_, cell)) = best {
            trace!(%coord, %cell, radius, "snapped to water");
            return Some(Snapped {
                coordinate: grid.unproject(cell),
                cell,
                radius,
            });
        }
    }

    None
}

/// Coordinate of the nearest water cell, or `coord` unchanged if none is
/// within reach.
pub fn snap_to_water(grid: &WaterGrid, coord: GeoCoordinate, max_radius: u32) -> GeoCoordinate {
    snap(grid, coord, max_radius)
        .map(|snapped| snapped.coordinate)
        .unwrap_or(coord)
}

/// In-grid cells at exactly Chebyshev distance `radius` from `origin`.
fn ring(grid: &WaterGrid, origin: GridCell, radius: u32) -> impl Iterator<Item = GridCell> + '_ {
    let r = radius as i64;
    (-r..=r).flat_map(move |dr| {
        let cols: Vec<i64> = if dr.abs() == r {
            (-r..=r).collect()
        } else {
            vec![-r, r]
        };
        cols.into_iter()
            .filter_map(move |dc| grid.offset(origin, dr, dc))
    })
}

fn centre_distance_sq(grid: &WaterGrid, cell: GridCell, frac_row: f64, frac_col: f64) -> f64 {
    let dr = cell.row as f64 + 0.5 - frac_row;
    let mut dc = (cell.col as f64 + 0.5 - frac_col).abs();
    if grid.wraps_longitude() {
        let cols = grid.cols() as f64;
        dc = dc.rem_euclid(cols);
        dc = dc.min(cols - dc);
    }
    dr * dr + dc * dc
}
