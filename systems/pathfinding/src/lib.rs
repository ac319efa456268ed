#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* route planning over navigation grids with a per-endpoint route cache.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

use cavern_defence_core::{CellCoord, Event, NavigationGrid, Route};
use tracing::{debug, trace};

/// Edge weighting applied while searching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CostModel {
    /// Every step costs exactly one.
    #[default]
    Uniform,
    /// Steps cost the grid's terrain cost, so moss and slopes are avoided when possible.
    TerrainWeighted,
}

/// Configuration parameters required to construct the path finder.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    cost_model: CostModel,
}

impl Config {
    /// Creates a new configuration using the provided cost model.
    #[must_use]
    pub const fn new(cost_model: CostModel) -> Self {
        Self { cost_model }
    }

    /// Cost model used for edge weights.
    #[must_use]
    pub const fn cost_model(&self) -> CostModel {
        self.cost_model
    }
}

/// Route planner that memoises results by their `(start, end)` endpoints.
///
/// Cached routes go stale when the terrain changes. Feed world events through
/// [`PathFinder::handle`] or call [`PathFinder::clear_cache`] after mutating
/// the grid.
#[derive(Debug, Default)]
pub struct PathFinder {
    config: Config,
    cache: HashMap<(CellCoord, CellCoord), Route>,
}

impl PathFinder {
    /// Creates a path finder with an empty cache.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: HashMap::new(),
        }
    }

    /// Returns the route from `start` to `end`, inclusive of both, or an empty
    /// route when the exit cannot be reached.
    ///
    /// Repeated calls with the same endpoints return the cached route.
    pub fn find_path<G>(&mut self, grid: &G, start: CellCoord, end: CellCoord) -> Route
    where
        G: NavigationGrid + ?Sized,
    {
        if let Some(route) = self.cache.get(&(start, end)) {
            return route.clone();
        }

        trace!(?start, ?end, "route cache miss");
        let route = search(grid, start, end, self.config.cost_model);
        let _ = self.cache.insert((start, end), route.clone());
        route
    }

    /// Drops every cached route.
    pub fn clear_cache(&mut self) {
        if !self.cache.is_empty() {
            debug!(routes = self.cache.len(), "clearing route cache");
        }
        self.cache.clear();
    }

    /// Consumes world events, invalidating the cache when the terrain changed.
    pub fn handle(&mut self, events: &[Event]) {
        if events.iter().any(Event::alters_terrain) {
            self.clear_cache();
        }
    }

    /// Number of endpoint pairs currently cached.
    #[must_use]
    pub fn cached_routes(&self) -> usize {
        self.cache.len()
    }
}

/// Runs an uncached A* search with a Manhattan heuristic and 4-way expansion.
///
/// A cell is expanded only when it lies inside the grid and is traversable,
/// except for `end`, which is always enterable. Ties on `f` prefer the node
/// closer to the goal, then the one discovered first.
pub fn search<G>(grid: &G, start: CellCoord, end: CellCoord, cost_model: CostModel) -> Route
where
    G: NavigationGrid + ?Sized,
{
    let (columns, rows) = grid.dimensions();
    let Some(start_index) = index(columns, rows, start) else {
        return Route::empty();
    };
    let Some(end_index) = index(columns, rows, end) else {
        return Route::empty();
    };
    if start_index == end_index {
        return Route::new(vec![start]);
    }

    let mut nodes = SearchNodes::new(columns, rows);
    let mut open: BinaryHeap<Reverse<OpenEntry>> = BinaryHeap::new();
    let mut sequence: u64 = 0;

    nodes.g[start_index] = 0;
    open.push(Reverse(OpenEntry {
        f: start.manhattan_distance(end),
        h: start.manhattan_distance(end),
        sequence,
        index: start_index,
    }));

    while let Some(Reverse(entry)) = open.pop() {
        if nodes.closed[entry.index] {
            continue;
        }
        nodes.closed[entry.index] = true;

        let cell = nodes.cell(entry.index);
        if entry.index == end_index {
            return nodes.reconstruct(end_index);
        }

        let current_g = nodes.g[entry.index];
        for neighbor in cell.cardinal_neighbors(columns, rows) {
            let Some(neighbor_index) = index(columns, rows, neighbor) else {
                continue;
            };
            if nodes.closed[neighbor_index] {
                continue;
            }
            if neighbor != end && !grid.is_traversable(neighbor) {
                continue;
            }

            let step = match cost_model {
                CostModel::Uniform => 1,
                CostModel::TerrainWeighted => grid.terrain_cost(cell, neighbor).max(1),
            };
            let tentative = current_g.saturating_add(step);
            if tentative >= nodes.g[neighbor_index] {
                continue;
            }

            nodes.g[neighbor_index] = tentative;
            nodes.parent[neighbor_index] = Some(entry.index);
            let h = neighbor.manhattan_distance(end);
            sequence += 1;
            open.push(Reverse(OpenEntry {
                f: tentative.saturating_add(h),
                h,
                sequence,
                index: neighbor_index,
            }));
        }
    }

    Route::empty()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: u32,
    h: u32,
    sequence: u64,
    index: usize,
}

#[derive(Debug)]
struct SearchNodes {
    columns: u32,
    g: Vec<u32>,
    parent: Vec<Option<usize>>,
    closed: Vec<bool>,
}

impl SearchNodes {
    fn new(columns: u32, rows: u32) -> Self {
        let count_u64 = u64::from(columns) * u64::from(rows);
        let count = usize::try_from(count_u64).unwrap_or(0);
        Self {
            columns,
            g: vec![u32::MAX; count],
            parent: vec![None; count],
            closed: vec![false; count],
        }
    }

    fn cell(&self, index: usize) -> CellCoord {
        let width = self.columns.max(1) as usize;
        CellCoord::new((index % width) as u32, (index / width) as u32)
    }

    fn reconstruct(&self, goal: usize) -> Route {
        let mut nodes = vec![self.cell(goal)];
        let mut cursor = goal;
        while let Some(previous) = self.parent[cursor] {
            nodes.push(self.cell(previous));
            cursor = previous;
        }
        nodes.reverse();
        Route::new(nodes)
    }
}

fn index(columns: u32, rows: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() < columns && cell.row() < rows {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}
