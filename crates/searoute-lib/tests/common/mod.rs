//! Common test utilities and fixture helpers.

use std::path::PathBuf;
use std::sync::Arc;

use searoute_lib::{load_mask_file, GridCell, WaterGrid};

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// 10x10 strait: column 5 is land except on row 0.
#[allow(dead_code)]
pub fn strait_grid() -> Arc<WaterGrid> {
    let path = fixtures_dir().join("strait_mask.json");
    Arc::new(load_mask_file(&path).expect("load fixture strait_mask.json"))
}

/// 4x8 global grid with a land meridian in column 3.
#[allow(dead_code)]
pub fn global_grid() -> Arc<WaterGrid> {
    let path = fixtures_dir().join("global_mask.json");
    Arc::new(load_mask_file(&path).expect("load fixture global_mask.json"))
}

/// Every cell is water and consecutive cells are 8-neighbours.
#[allow(dead_code)]
pub fn assert_adjacent_water_chain(grid: &WaterGrid, cells: &[GridCell]) {
    for cell in cells {
        assert!(grid.is_navigable(*cell), "{cell} is not water");
    }
    for pair in cells.windows(2) {
        assert_eq!(
            grid.chebyshev(pair[0], pair[1]),
            1,
            "{} and {} are not adjacent",
            pair[0],
            pair[1]
        );
    }
}
