//! Immutable water/land grid and its projection helpers.
//!
//! The grid covers a latitude/longitude box at a uniform angular resolution.
//! Row 0 sits on the north edge and column 0 on the west edge; a cell is
//! addressed by its integer `(row, col)` pair and stored row-major in a single
//! owned buffer.
//!
//! ```
//! use searoute_lib::{GeoCoordinate, GridCell, WaterGrid};
//!
//! let grid = WaterGrid::from_ascii(2.0, 0.0, 1.0, "~#\n~~").unwrap();
//! assert_eq!(grid.project(GeoCoordinate::new(1.5, 0.5)), Some(GridCell::new(0, 0)));
//! assert!(!grid.is_water(GeoCoordinate::new(1.5, 1.5)));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::{normalize_lon, GeoCoordinate};

/// Tolerance used when comparing degree extents.
const DEGREE_EPSILON: f64 = 1e-9;

/// Neighbour offsets: orthogonal first (N, S, W, E), then diagonals.
const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Placement and resolution of a water grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Latitude of the north edge in degrees.
    pub north: f64,
    /// Longitude of the west edge in degrees.
    pub west: f64,
    /// Cell size in degrees along both axes.
    pub resolution: f64,
    pub rows: u32,
    pub cols: u32,
}

impl GridGeometry {
    pub fn south(&self) -> f64 {
        self.north - self.rows as f64 * self.resolution
    }

    pub fn east(&self) -> f64 {
        self.west + self.cols as f64 * self.resolution
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// True when the columns span the full 360 degrees of longitude.
    pub fn wraps_longitude(&self) -> bool {
        (self.cols as f64 * self.resolution - 360.0).abs() < DEGREE_EPSILON
    }

    /// Check the metadata describes a usable box.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::invalid(format!(
                "grid dimensions must be non-zero (rows={}, cols={})",
                self.rows, self.cols
            )));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(Error::invalid(format!(
                "resolution must be a positive number of degrees, got {}",
                self.resolution
            )));
        }
        if !self.north.is_finite() || !self.west.is_finite() {
            return Err(Error::invalid("grid origin must be finite"));
        }
        if self.north > 90.0 + DEGREE_EPSILON || self.south() < -90.0 - DEGREE_EPSILON {
            return Err(Error::invalid(format!(
                "latitude span {}..{} leaves [-90, 90]",
                self.south(),
                self.north
            )));
        }
        if self.cols as f64 * self.resolution > 360.0 + DEGREE_EPSILON {
            return Err(Error::invalid(format!(
                "longitude span of {} degrees exceeds 360",
                self.cols as f64 * self.resolution
            )));
        }
        Ok(())
    }

    /// Pick the longitude representation closest to the grid's centre so that
    /// boxes crossing the antimeridian project correctly.
    fn align_lon(&self, lon: f64) -> f64 {
        if self.wraps_longitude() {
            normalize_lon(lon, self.west)
        } else {
            let centre = self.west + self.cols as f64 * self.resolution / 2.0;
            normalize_lon(lon, centre - 180.0)
        }
    }
}

/// Integer `(row, col)` index into a [`WaterGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
}

impl GridCell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Read-only navigability mask.
///
/// Constructed once from a decoded mask; nothing mutates it afterwards, so a
/// single `Arc<WaterGrid>` can back any number of concurrent searches.
#[derive(Clone, PartialEq)]
pub struct WaterGrid {
    geometry: GridGeometry,
    cells: Vec<bool>,
}

impl WaterGrid {
    /// Build a grid from row-major navigability flags (`true` = water).
    pub fn new(geometry: GridGeometry, cells: Vec<bool>) -> Result<Self> {
        geometry.validate()?;
        if cells.len() != geometry.cell_count() {
            return Err(Error::invalid(format!(
                "dimension mismatch: {} rows x {} cols needs {} cells, got {}",
                geometry.rows,
                geometry.cols,
                geometry.cell_count(),
                cells.len()
            )));
        }
        Ok(Self { geometry, cells })
    }

    /// Build a grid from an ASCII drawing, one line per row, north first.
    ///
    /// `~`, `.` and `w` are water; `#`, `X` and `L` are land. Blank lines and
    /// surrounding whitespace are ignored.
    pub fn from_ascii(north: f64, west: f64, resolution: f64, text: &str) -> Result<Self> {
        let mut cells = Vec::new();
        let mut rows = 0u32;
        let mut cols: Option<usize> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let width = line.chars().count();
            match cols {
                Some(expected) if expected != width => {
                    return Err(Error::invalid(format!(
                        "row {rows} has {width} cells, expected {expected}"
                    )));
                }
                _ => cols = Some(width),
            }
            for ch in line.chars() {
                let water = match ch {
                    '~' | '.' | 'w' => true,
                    '#' | 'X' | 'L' => false,
                    other => {
                        return Err(Error::invalid(format!(
                            "unexpected cell character '{other}' in row {rows}"
                        )))
                    }
                };
                cells.push(water);
            }
            rows += 1;
        }

        let geometry = GridGeometry {
            north,
            west,
            resolution,
            rows,
            cols: cols.unwrap_or(0) as u32,
        };
        Self::new(geometry, cells)
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn rows(&self) -> u32 {
        self.geometry.rows
    }

    pub fn cols(&self) -> u32 {
        self.geometry.cols
    }

    pub fn wraps_longitude(&self) -> bool {
        self.geometry.wraps_longitude()
    }

    /// Row-major navigability flags.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of navigable cells.
    pub fn water_count(&self) -> usize {
        self.cells.iter().filter(|&&water| water).count()
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.row < self.geometry.rows && cell.col < self.geometry.cols
    }

    /// Flat buffer index of an in-grid cell.
    pub fn index(&self, cell: GridCell) -> usize {
        cell.row as usize * self.geometry.cols as usize + cell.col as usize
    }

    pub fn cell_at(&self, index: usize) -> GridCell {
        let cols = self.geometry.cols as usize;
        GridCell::new((index / cols) as u32, (index % cols) as u32)
    }

    /// Whether `cell` is inside the grid and classified as water.
    pub fn is_navigable(&self, cell: GridCell) -> bool {
        self.contains(cell) && self.cells[self.index(cell)]
    }

    /// Continuous `(row, col)` position in cell units, not clamped to the grid.
    ///
    /// Cell `(r, c)` spans `[r, r + 1) x [c, c + 1)`; its centre is at
    /// `(r + 0.5, c + 0.5)`.
    pub fn fractional_position(&self, coord: GeoCoordinate) -> (f64, f64) {
        let g = &self.geometry;
        let row = (g.north - coord.lat) / g.resolution;
        let col = (g.align_lon(coord.lon) - g.west) / g.resolution;
        (row, col)
    }

    /// Map a coordinate to its grid cell, or `None` outside the covered box.
    pub fn project(&self, coord: GeoCoordinate) -> Option<GridCell> {
        if !coord.lat.is_finite() || !coord.lon.is_finite() {
            return None;
        }
        let (row, col) = self.fractional_position(coord);
        if row < 0.0 || col < 0.0 {
            return None;
        }
        let (row, col) = (row.floor(), col.floor());
        if row >= self.geometry.rows as f64 || col >= self.geometry.cols as f64 {
            return None;
        }
        Some(GridCell::new(row as u32, col as u32))
    }

    /// Map a coordinate to the nearest in-grid cell.
    pub fn project_clamped(&self, coord: GeoCoordinate) -> GridCell {
        let (row, col) = self.fractional_position(coord);
        let max_row = (self.geometry.rows - 1) as f64;
        let max_col = (self.geometry.cols - 1) as f64;
        let row = row.floor().clamp(0.0, max_row);
        let col = col.floor().clamp(0.0, max_col);
        // NaN survives clamp; `as` maps it to zero.
        GridCell::new(row as u32, col as u32)
    }

    /// Geographic centre of `cell`, longitude normalised into `[-180, 180)`.
    pub fn unproject(&self, cell: GridCell) -> GeoCoordinate {
        let g = &self.geometry;
        let lat = g.north - (cell.row as f64 + 0.5) * g.resolution;
        let lon = g.west + (cell.col as f64 + 0.5) * g.resolution;
        GeoCoordinate::new(lat, normalize_lon(lon, -180.0))
    }

    /// Whether the coordinate falls on a water cell. Out-of-grid is land.
    pub fn is_water(&self, coord: GeoCoordinate) -> bool {
        self.project(coord)
            .map(|cell| self.cells[self.index(cell)])
            .unwrap_or(false)
    }

    /// Cell reached by moving `(d_row, d_col)` from `cell`, wrapping columns on
    /// global grids.
    pub fn offset(&self, cell: GridCell, d_row: i64, d_col: i64) -> Option<GridCell> {
        let rows = self.geometry.rows as i64;
        let cols = self.geometry.cols as i64;
        let row = cell.row as i64 + d_row;
        if row < 0 || row >= rows {
            return None;
        }
        let mut col = cell.col as i64 + d_col;
        if self.wraps_longitude() {
            col = col.rem_euclid(cols);
        } else if col < 0 || col >= cols {
            return None;
        }
        Some(GridCell::new(row as u32, col as u32))
    }

    /// In-grid neighbours of `cell` with a flag marking diagonal moves.
    pub fn neighbours(&self, cell: GridCell) -> impl Iterator<Item = (GridCell, bool)> + '_ {
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(move |&(dr, dc)| {
                self.offset(cell, dr, dc)
                    .map(|next| (next, dr != 0 && dc != 0))
            })
            .filter(move |(next, _)| *next != cell)
    }

    /// Column distance between two cells, taking the short way round on
    /// wrapping grids.
    pub fn col_delta(&self, a: u32, b: u32) -> u32 {
        let direct = a.abs_diff(b);
        if self.wraps_longitude() {
            direct.min(self.geometry.cols - direct)
        } else {
            direct
        }
    }

    /// Chebyshev distance between two cells in cell units.
    pub fn chebyshev(&self, a: GridCell, b: GridCell) -> u32 {
        a.row.abs_diff(b.row).max(self.col_delta(a.col, b.col))
    }
}

impl std::fmt::Debug for WaterGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaterGrid")
            .field("geometry", &self.geometry)
            .field("water_cells", &self.water_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> WaterGrid {
        WaterGrid::from_ascii(
            10.0,
            0.0,
            1.0,
            "
            ~~~~
            ~##~
            ~~~~
            ",
        )
        .unwrap()
    }

    #[test]
    fn from_ascii_reads_dimensions() {
        let grid = small();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.water_count(), 10);
        assert!(!grid.is_navigable(GridCell::new(1, 1)));
    }

    #[test]
    fn from_ascii_rejects_ragged_rows() {
        let err = WaterGrid::from_ascii(0.0, 0.0, 1.0, "~~\n~").unwrap_err();
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn new_rejects_dimension_mismatch() {
        let geometry = GridGeometry {
            north: 1.0,
            west: 0.0,
            resolution: 1.0,
            rows: 2,
            cols: 2,
        };
        let err = WaterGrid::new(geometry, vec![true; 3]).unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[test]
    fn validate_rejects_bad_resolution_and_latitude() {
        let mut geometry = GridGeometry {
            north: 10.0,
            west: 0.0,
            resolution: 0.0,
            rows: 1,
            cols: 1,
        };
        assert!(geometry.validate().is_err());
        geometry.resolution = 1.0;
        geometry.north = 95.0;
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn project_and_unproject_round_trip_centres() {
        let grid = small();
        for index in 0..grid.len() {
            let cell = grid.cell_at(index);
            assert_eq!(grid.project(grid.unproject(cell)), Some(cell));
        }
    }

    #[test]
    fn project_rejects_out_of_bounds() {
        let grid = small();
        assert_eq!(grid.project(GeoCoordinate::new(10.5, 1.0)), None);
        assert_eq!(grid.project(GeoCoordinate::new(7.0, 1.0)), None);
        assert_eq!(grid.project(GeoCoordinate::new(9.0, -0.5)), None);
        assert_eq!(grid.project(GeoCoordinate::new(9.0, 4.0)), None);
        assert_eq!(
            grid.project(GeoCoordinate::new(10.0, 0.0)),
            Some(GridCell::new(0, 0))
        );
    }

    #[test]
    fn out_of_grid_is_never_water() {
        let grid = small();
        assert!(grid.is_water(GeoCoordinate::new(9.5, 0.5)));
        assert!(!grid.is_water(GeoCoordinate::new(50.0, 0.5)));
        assert!(!grid.is_water(GeoCoordinate::new(f64::NAN, 0.5)));
    }

    #[test]
    fn clamped_projection_picks_nearest_edge_cell() {
        let grid = small();
        assert_eq!(
            grid.project_clamped(GeoCoordinate::new(40.0, -3.0)),
            GridCell::new(0, 0)
        );
        assert_eq!(
            grid.project_clamped(GeoCoordinate::new(-40.0, 9.0)),
            GridCell::new(2, 3)
        );
    }

    #[test]
    fn antimeridian_box_projects_both_sides() {
        let geometry = GridGeometry {
            north: 10.0,
            west: 170.0,
            resolution: 5.0,
            rows: 2,
            cols: 4,
        };
        let grid = WaterGrid::new(geometry, vec![true; 8]).unwrap();
        assert_eq!(
            grid.project(GeoCoordinate::new(7.0, 172.0)),
            Some(GridCell::new(0, 0))
        );
        assert_eq!(
            grid.project(GeoCoordinate::new(7.0, -172.0)),
            Some(GridCell::new(0, 3))
        );
        let centre = grid.unproject(GridCell::new(0, 3));
        assert!((centre.lon - -172.5).abs() < 1e-9);
    }

    #[test]
    fn wrapping_grid_links_first_and_last_columns() {
        let geometry = GridGeometry {
            north: 90.0,
            west: -180.0,
            resolution: 90.0,
            rows: 2,
            cols: 4,
        };
        let grid = WaterGrid::new(geometry, vec![true; 8]).unwrap();
        assert!(grid.wraps_longitude());
        let neighbours: Vec<_> = grid
            .neighbours(GridCell::new(0, 0))
            .map(|(c, _)| c)
            .collect();
        assert!(neighbours.contains(&GridCell::new(0, 3)));
        assert_eq!(grid.col_delta(0, 3), 1);
    }

    #[test]
    fn corner_cell_has_three_neighbours_on_bounded_grid() {
        let grid = small();
        let neighbours: Vec<_> = grid.neighbours(GridCell::new(0, 0)).collect();
        assert_eq!(neighbours.len(), 3);
        assert_eq!(neighbours.iter().filter(|(_, diagonal)| *diagonal).count(), 1);
    }
}
