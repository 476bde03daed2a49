//! A* search over the 8-connected water grid.
//!
//! Both cost models come with an admissible, consistent heuristic, so a
//! [`SearchOutcome::Found`] path is a shortest one under its model.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::{haversine_km, GeoCoordinate};
use crate::grid::{GridCell, WaterGrid};

/// Keeps floating-point noise from pushing the heuristic above the true cost.
const HEURISTIC_SLACK: f64 = 1.0 - 1e-9;

/// How often (in expansions) the deadline is checked after the first one.
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// Edge-cost metric for the grid search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CostModel {
    /// Unit grid steps: 1 orthogonal, sqrt(2) diagonal.
    Grid,
    /// Great-circle kilometres between cell centres.
    #[default]
    Geographic,
}

impl fmt::Display for CostModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CostModel::Grid => "grid",
            CostModel::Geographic => "geographic",
        })
    }
}

impl FromStr for CostModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(CostModel::Grid),
            "geographic" | "geo" => Ok(CostModel::Geographic),
            other => Err(format!("unknown cost model '{other}'")),
        }
    }
}

/// Knobs for a single search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub cost_model: CostModel,
    /// Give up after settling this many cells.
    pub max_expansions: Option<usize>,
    /// Give up once this much wall-clock time has elapsed. Checked on the
    /// first expansion and every `DEADLINE_CHECK_INTERVAL` after that.
    pub timeout: Option<Duration>,
    /// Forbid diagonal steps squeezing between two land cells.
    pub block_corner_cutting: bool,
}

/// Why a search produced no path. None of these are faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoRouteReason {
    StartOutOfGrid,
    GoalOutOfGrid,
    StartOnLand,
    GoalOnLand,
    /// Both endpoints resolve to the same cell.
    SameCell,
    /// Open set exhausted: the endpoints are in separate water bodies.
    Disconnected,
    ExpansionLimit,
    DeadlineExceeded,
}

impl fmt::Display for NoRouteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoRouteReason::StartOutOfGrid => "start is outside the water grid",
            NoRouteReason::GoalOutOfGrid => "goal is outside the water grid",
            NoRouteReason::StartOnLand => "no navigable water near the start",
            NoRouteReason::GoalOnLand => "no navigable water near the goal",
            NoRouteReason::SameCell => "start and goal share one grid cell",
            NoRouteReason::Disconnected => "start and goal are in disconnected water bodies",
            NoRouteReason::ExpansionLimit => "search expansion limit reached",
            NoRouteReason::DeadlineExceeded => "search deadline exceeded",
        })
    }
}

/// Chain of adjacent water cells with the accumulated cost at each one.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPath {
    pub cells: Vec<GridCell>,
    /// `costs[i]` is the `g` score of `cells[i]`; non-decreasing.
    pub costs: Vec<f64>,
    pub nodes_expanded: usize,
}

impl CellPath {
    /// Total cost of reaching the goal.
    pub fn cost(&self) -> f64 {
        self.costs.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Result of [`find_cell_path`].
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(CellPath),
    NoRoute {
        reason: NoRouteReason,
        nodes_expanded: usize,
    },
}

impl SearchOutcome {
    pub fn into_path(self) -> Option<CellPath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::NoRoute { .. } => None,
        }
    }

    fn no_route(reason: NoRouteReason, nodes_expanded: usize) -> Self {
        SearchOutcome::NoRoute {
            reason,
            nodes_expanded,
        }
    }
}

/// Per-row step costs for one grid and cost model.
struct EdgeCosts {
    north_south: f64,
    /// East-west step cost on each row.
    east_west: Vec<f64>,
    /// Diagonal step cost between row `r` and row `r + 1`.
    diagonal: Vec<f64>,
}

impl EdgeCosts {
    fn new(grid: &WaterGrid, model: CostModel) -> Self {
        let rows = grid.rows() as usize;
        match model {
            CostModel::Grid => Self {
                north_south: 1.0,
                east_west: vec![1.0; rows],
                diagonal: vec![std::f64::consts::SQRT_2; rows],
            },
            CostModel::Geographic => {
                let res = grid.geometry().resolution;
                let lat_of = |row: usize| grid.unproject(GridCell::new(row as u32, 0)).lat;
                let east_west = (0..rows)
                    .map(|row| {
                        let lat = lat_of(row);
                        haversine_km(GeoCoordinate::new(lat, 0.0), GeoCoordinate::new(lat, res))
                    })
                    .collect();
                let diagonal = (0..rows)
                    .map(|row| {
                        let lat = lat_of(row);
                        haversine_km(
                            GeoCoordinate::new(lat, 0.0),
                            GeoCoordinate::new(lat - res, res),
                        )
                    })
                    .collect();
                Self {
                    north_south: haversine_km(
                        GeoCoordinate::new(0.0, 0.0),
                        GeoCoordinate::new(res, 0.0),
                    ),
                    east_west,
                    diagonal,
                }
            }
        }
    }

    fn step(&self, from: GridCell, to: GridCell, diagonal: bool) -> f64 {
        if diagonal {
            self.diagonal[from.row.min(to.row) as usize]
        } else if from.row == to.row {
            self.east_west[from.row as usize]
        } else {
            self.north_south
        }
    }
}

struct Heuristic<'a> {
    grid: &'a WaterGrid,
    model: CostModel,
    goal: GridCell,
    goal_centre: GeoCoordinate,
}

impl<'a> Heuristic<'a> {
    fn new(grid: &'a WaterGrid, model: CostModel, goal: GridCell) -> Self {
        Self {
            grid,
            model,
            goal,
            goal_centre: grid.unproject(goal),
        }
    }

    fn estimate(&self, cell: GridCell) -> f64 {
        let raw = match self.model {
            CostModel::Grid => {
                let dr = cell.row.abs_diff(self.goal.row) as f64;
                let dc = self.grid.col_delta(cell.col, self.goal.col) as f64;
                let (long, short) = if dr > dc { (dr, dc) } else { (dc, dr) };
                long + (std::f64::consts::SQRT_2 - 1.0) * short
            }
            CostModel::Geographic => haversine_km(self.grid.unproject(cell), self.goal_centre),
        };
        raw * HEURISTIC_SLACK
    }
}

/// A* search over navigable cells from `start` to `goal` (both inclusive).
pub fn find_cell_path(
    grid: &WaterGrid,
    start: GridCell,
    goal: GridCell,
    options: &SearchOptions,
) -> SearchOutcome {
    if !grid.contains(start) {
        return SearchOutcome::no_route(NoRouteReason::StartOutOfGrid, 0);
    }
    if !grid.contains(goal) {
        return SearchOutcome::no_route(NoRouteReason::GoalOutOfGrid, 0);
    }
    if !grid.is_navigable(start) {
        return SearchOutcome::no_route(NoRouteReason::StartOnLand, 0);
    }
    if !grid.is_navigable(goal) {
        return SearchOutcome::no_route(NoRouteReason::GoalOnLand, 0);
    }
    if start == goal {
        return SearchOutcome::Found(CellPath {
            cells: vec![start],
            costs: vec![0.0],
            nodes_expanded: 0,
        });
    }

    let costs = EdgeCosts::new(grid, options.cost_model);
    let heuristic = Heuristic::new(grid, options.cost_model, goal);
    let deadline = options.timeout.map(|timeout| Instant::now() + timeout);

    let start_index = grid.index(start);
    let goal_index = grid.index(goal);

    let mut g_score: HashMap<usize, f64> = HashMap::new();
    let mut parents: HashMap<usize, Option<usize>> = HashMap::new();
    let mut closed: HashSet<usize> = HashSet::new();
    let mut queue = BinaryHeap::new();

    g_score.insert(start_index, 0.0);
    parents.insert(start_index, None);
    queue.push(AStarEntry::new(start_index, 0.0, heuristic.estimate(start)));

    let mut expanded = 0usize;

    while let Some(entry) = queue.pop() {
        if closed.contains(&entry.node) {
            continue;
        }
        let current_score = match g_score.get(&entry.node) {
            Some(score) if *score < entry.cost.0 => continue,
            Some(score) => *score,
            None => continue,
        };

        if entry.node == goal_index {
            let path =
                reconstruct_path(grid, &parents, &g_score, start_index, goal_index, expanded);
            debug!(
                start = %start,
                goal = %goal,
                cells = path.len(),
                cost = path.cost(),
                nodes_expanded = expanded,
                "grid path found"
            );
            return SearchOutcome::Found(path);
        }

        closed.insert(entry.node);
        expanded += 1;

        if options.max_expansions.is_some_and(|limit| expanded > limit) {
            debug!(nodes_expanded = expanded, "expansion limit reached");
            return SearchOutcome::no_route(NoRouteReason::ExpansionLimit, expanded);
        }
        if let Some(deadline) = deadline {
            let due = expanded == 1 || expanded % DEADLINE_CHECK_INTERVAL == 0;
            if due && Instant::now() >= deadline {
                debug!(nodes_expanded = expanded, "search deadline exceeded");
                return SearchOutcome::no_route(NoRouteReason::DeadlineExceeded, expanded);
            }
        }

        let current = grid.cell_at(entry.node);
        for (next, diagonal) in grid.neighbours(current) {
            if !grid.is_navigable(next) {
                continue;
            }
            let next_index = grid.index(next);
            if closed.contains(&next_index) {
                continue;
            }
            if diagonal && options.block_corner_cutting && cuts_corner(grid, current, next) {
                continue;
            }

            let tentative_g = current_score + costs.step(current, next, diagonal);
            if tentative_g < *g_score.get(&next_index).unwrap_or(&f64::INFINITY) {
                g_score.insert(next_index, tentative_g);
                parents.insert(next_index, Some(entry.node));
                queue.push(AStarEntry::new(
                    next_index,
                    tentative_g,
                    heuristic.estimate(next),
                ));
            }
        }
    }

    debug!(start = %start, goal = %goal, nodes_expanded = expanded, "open set exhausted");
    SearchOutcome::no_route(NoRouteReason::Disconnected, expanded)
}

/// A diagonal step cuts a corner when both orthogonal side cells are land.
fn cuts_corner(grid: &WaterGrid, from: GridCell, to: GridCell) -> bool {
    let side_a = GridCell::new(from.row, to.col);
    let side_b = GridCell::new(to.row, from.col);
    !grid.is_navigable(side_a) && !grid.is_navigable(side_b)
}

fn reconstruct_path(
    grid: &WaterGrid,
    parents: &HashMap<usize, Option<usize>>,
    g_score: &HashMap<usize, f64>,
    start: usize,
    goal: usize,
    nodes_expanded: usize,
) -> CellPath {
    let mut cells = Vec::new();
    let mut costs = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        cells.push(grid.cell_at(node));
        costs.push(g_score.get(&node).copied().unwrap_or(0.0));
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    cells.reverse();
    costs.reverse();
    CellPath {
        cells,
        costs,
        nodes_expanded,
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: usize,
    cost: FloatOrd,
    heuristic: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: usize, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            heuristic: FloatOrd(heuristic),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest f, then the lowest h.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.heuristic.cmp(&self.heuristic))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
