// Test-only grids shared by the unit tests of `searoute-lib`.
#![allow(dead_code)]

use crate::grid::{GridCell, WaterGrid};

/// 10x10 basin split by a land wall in column 5, open only at row 0.
pub fn strait_grid() -> WaterGrid {
    WaterGrid::from_ascii(
        10.0,
        0.0,
        1.0,
        "
        ~~~~~~~~~~
        ~~~~~#~~~~
        ~~~~~#~~~~
        ~~~~~#~~~~
        ~~~~~#~~~~
        ~~~~~#~~~~
        ~~~~~#~~~~
        ~~~~~#~~~~
        ~~~~~#~~~~
        ~~~~~#~~~~
        ",
    )
    .expect("strait grid is well formed")
}

/// Two water bodies separated by a solid land column.
pub fn two_basins() -> WaterGrid {
    WaterGrid::from_ascii(
        5.0,
        0.0,
        1.0,
        "
        ~~#~~
        ~~#~~
        ~~#~~
        ~~#~~
        ~~#~~
        ",
    )
    .expect("two-basin grid is well formed")
}

/// Fully navigable square grid.
pub fn open_sea(size: usize) -> WaterGrid {
    let row = "~".repeat(size);
    let text = vec![row; size].join("\n");
    WaterGrid::from_ascii(size as f64, 0.0, 1.0, &text).expect("open sea grid is well formed")
}

/// Every consecutive pair is 8-connected and every cell is water.
pub fn is_adjacent_chain(grid: &WaterGrid, cells: &[GridCell]) -> bool {
    cells.iter().all(|c| grid.is_navigable(*c))
        && cells.windows(2).all(|w| grid.chebyshev(w[0], w[1]) == 1)
}
