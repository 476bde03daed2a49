use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use searoute_lib::{
    find_cell_path, snap, CostModel, GeoCoordinate, GridCell, GridGeometry, RouterConfig,
    SeaRouter, SearchOptions, SimplifyMode, WaterGrid,
};
use std::hint::black_box;
use std::sync::Arc;

const SIZE: u32 = 512;

/// Open sea with staggered walls every 32 columns, each leaving one gap
/// alternately at the top and bottom so routes have to snake.
static MAZE: Lazy<Arc<WaterGrid>> = Lazy::new(|| {
    let mut cells = vec![true; (SIZE * SIZE) as usize];
    for (n, col) in (16..SIZE).step_by(32).enumerate() {
        let gap = if n % 2 == 0 { 0 } else { SIZE - 1 };
        for row in 0..SIZE {
            if row != gap {
                cells[(row * SIZE + col) as usize] = false;
            }
        }
    }
    let geometry = GridGeometry {
        north: 60.0,
        west: -30.0,
        resolution: 0.1,
        rows: SIZE,
        cols: SIZE,
    };
    Arc::new(WaterGrid::new(geometry, cells).expect("maze grid is valid"))
});

fn benchmark_pathfinding(c: &mut Criterion) {
    let grid = &*MAZE;
    let start = GridCell::new(SIZE / 2, 0);
    let goal = GridCell::new(SIZE / 2, SIZE - 1);

    c.bench_function("astar_grid_maze", |b| {
        let options = SearchOptions {
            cost_model: CostModel::Grid,
            ..SearchOptions::default()
        };
        b.iter(|| {
            let path = find_cell_path(grid, start, goal, &options)
                .into_path()
                .expect("route exists");
            black_box(path.len())
        });
    });

    c.bench_function("astar_geographic_maze", |b| {
        let options = SearchOptions::default();
        b.iter(|| {
            let path = find_cell_path(grid, start, goal, &options)
                .into_path()
                .expect("route exists");
            black_box(path.cost())
        });
    });

    c.bench_function("router_line_of_sight_maze", |b| {
        let router = SeaRouter::new(
            Arc::clone(grid),
            RouterConfig {
                simplify: SimplifyMode::LineOfSight,
                ..RouterConfig::default()
            },
        );
        let from = grid.unproject(start);
        let to = grid.unproject(goal);
        b.iter(|| {
            let path = router.find_sea_route(from, to).expect("route exists");
            black_box(path.len())
        });
    });

    c.bench_function("snap_from_wall", |b| {
        let on_wall = grid.unproject(GridCell::new(SIZE / 2, 16));
        b.iter(|| black_box(snap(grid, black_box(on_wall), 10)));
    });

    c.bench_function("snap_open_water", |b| {
        let at = GeoCoordinate::new(40.0, -10.0);
        b.iter(|| black_box(snap(grid, black_box(at), 10)));
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
