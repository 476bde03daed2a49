//! Drop redundant vertices from a cell path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::grid::{GridCell, WaterGrid};

/// How aggressively to thin a cell path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SimplifyMode {
    /// Keep every cell.
    Off,
    /// Keep only cells where the step direction changes.
    #[default]
    Collinear,
    /// Greedily skip ahead while the straight segment stays on water.
    LineOfSight,
}

impl fmt::Display for SimplifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SimplifyMode::Off => "off",
            SimplifyMode::Collinear => "collinear",
            SimplifyMode::LineOfSight => "line-of-sight",
        })
    }
}

impl FromStr for SimplifyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(SimplifyMode::Off),
            "collinear" => Ok(SimplifyMode::Collinear),
            "line-of-sight" | "los" => Ok(SimplifyMode::LineOfSight),
            other => Err(format!("unknown simplify mode '{other}'")),
        }
    }
}

/// Thin `cells` according to `mode`. Endpoints are always kept.
pub fn simplify(grid: &WaterGrid, cells: &[GridCell], mode: SimplifyMode) -> Vec<GridCell> {
    if cells.len() <= 2 {
        return cells.to_vec();
    }
    match mode {
        SimplifyMode::Off => cells.to_vec(),
        SimplifyMode::Collinear => drop_collinear(grid, cells),
        SimplifyMode::LineOfSight => pull_string(grid, cells),
    }
}

fn drop_collinear(grid: &WaterGrid, cells: &[GridCell]) -> Vec<GridCell> {
    let mut kept = vec![cells[0]];
    for window in cells.windows(3) {
        if step(grid, window[0], window[1]) != step(grid, window[1], window[2]) {
            kept.push(window[1]);
        }
    }
    kept.push(cells[cells.len() - 1]);
    kept
}

fn pull_string(grid: &WaterGrid, cells: &[GridCell]) -> Vec<GridCell> {
    let last = cells.len() - 1;
    let mut kept = vec![cells[0]];
    let mut anchor = 0;
    while anchor < last {
        let mut reach = anchor + 1;
        while reach < last && line_is_navigable(grid, cells[anchor], cells[reach + 1]) {
            reach += 1;
        }
        kept.push(cells[reach]);
        anchor = reach;
    }
    kept
}

/// Signed `(d_row, d_col)` from `a` to `b`, short way round on wrapping grids.
fn step(grid: &WaterGrid, a: GridCell, b: GridCell) -> (i64, i64) {
    let d_row = b.row as i64 - a.row as i64;
    let mut d_col = b.col as i64 - a.col as i64;
    if grid.wraps_longitude() {
        let cols = grid.cols() as i64;
        if d_col > cols / 2 {
            d_col -= cols;
        } else if d_col < -cols / 2 {
            d_col += cols;
        }
    }
    (d_row, d_col)
}

/// Whether every cell the straight segment between the two centres touches is
/// water. Where the segment passes exactly through a cell corner, both cells
/// beside the corner must be water as well.
pub fn line_is_navigable(grid: &WaterGrid, from: GridCell, to: GridCell) -> bool {
    let (d_row, d_col) = step(grid, from, to);
    let (n_row, n_col) = (d_row.abs(), d_col.abs());
    let (s_row, s_col) = (d_row.signum(), d_col.signum());
    let water = |dr: i64, dc: i64| {
        grid.offset(from, dr, dc)
            .is_some_and(|cell| grid.is_navigable(cell))
    };

    if !water(0, 0) {
        return false;
    }

    let (mut row, mut col) = (0i64, 0i64);
    let (mut i_row, mut i_col) = (0i64, 0i64);
    while i_row < n_row || i_col < n_col {
        let decision = (1 + 2 * i_col) * n_row - (1 + 2 * i_row) * n_col;
        if decision == 0 {
            if !water(row + s_row, col) || !water(row, col + s_col) {
                return false;
            }
            row += s_row;
            col += s_col;
            i_row += 1;
            i_col += 1;
        } else if decision < 0 {
            col += s_col;
            i_col += 1;
        } else {
            row += s_row;
            i_row += 1;
        }
        if !water(row, col) {
            return false;
        }
    }
    true
}
