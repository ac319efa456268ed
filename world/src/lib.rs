#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative terrain state management for Cavern Defence.
//!
//! The [`World`] owns the logical terrain only: a square grid of tiles with a
//! terrain kind, a height and a cached buildability flag, plus the spawn and
//! exit points. It never holds renderable resources. Every mutation flows
//! through [`apply`] and is reported as an [`Event`] so presentation layers and
//! caches can react to exactly what changed.

mod navigation;
mod state;

use cavern_defence_core::{
    clamp_height, CellCoord, Command, Event, TerrainKind, DEFAULT_TILE_HEIGHT, NEIGHBOR_SMOOTHING,
};
use tracing::trace;

pub use navigation::TerrainView;
pub use state::{import_state, ImportError};

/// Edge length used by [`World::new`].
pub const DEFAULT_GRID_SIZE: u32 = 20;

/// Smallest grid edge that still fits distinct spawn and exit points.
pub const MIN_GRID_SIZE: u32 = 2;

/// Largest grid edge a world will allocate.
pub const MAX_GRID_SIZE: u32 = 1024;

/// Represents the authoritative Cavern Defence terrain.
#[derive(Clone, Debug)]
pub struct World {
    terrain: TerrainGrid,
    spawn_point: CellCoord,
    exit_point: CellCoord,
}

impl World {
    /// Creates a world with the default grid size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_grid_size(DEFAULT_GRID_SIZE)
    }

    /// Creates a world whose square grid spans `grid_size` tiles per edge.
    ///
    /// Sizes outside [`MIN_GRID_SIZE`]..=[`MAX_GRID_SIZE`] are clamped. The spawn point starts
    /// on the west edge and the exit on the east edge, both on the middle row.
    #[must_use]
    pub fn with_grid_size(grid_size: u32) -> Self {
        let grid_size = grid_size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
        let middle = grid_size / 2;
        let mut world = Self {
            terrain: TerrainGrid::new(grid_size),
            spawn_point: CellCoord::new(0, middle),
            exit_point: CellCoord::new(grid_size - 1, middle),
        };
        world.refresh_all_buildable();
        world
    }

    fn refresh_buildable(&mut self, cell: CellCoord) {
        let Some(index) = self.terrain.index(cell) else {
            return;
        };
        let buildable = self.terrain.kinds[index].is_buildable()
            && cell != self.spawn_point
            && cell != self.exit_point;
        self.terrain.buildable[index] = buildable;
    }

    fn refresh_all_buildable(&mut self) {
        let size = self.terrain.size;
        for row in 0..size {
            for column in 0..size {
                self.refresh_buildable(CellCoord::new(column, row));
            }
        }
    }

    fn paint_tile(&mut self, cell: CellCoord, kind: TerrainKind, out_events: &mut Vec<Event>) {
        let Some(index) = self.terrain.index(cell) else {
            trace!(?cell, "paint outside grid ignored");
            return;
        };

        let from = self.terrain.kinds[index];
        if from == kind {
            return;
        }

        self.terrain.kinds[index] = kind;
        self.refresh_buildable(cell);
        out_events.push(Event::TilePainted {
            cell,
            from,
            to: kind,
        });
    }

    fn adjust_height(&mut self, cell: CellCoord, delta: f32, out_events: &mut Vec<Event>) {
        if !delta.is_finite() {
            return;
        }
        let Some(index) = self.terrain.index(cell) else {
            trace!(?cell, "height adjustment outside grid ignored");
            return;
        };

        let from = self.terrain.heights[index];
        let to = clamp_height(from + delta);
        if to == from {
            return;
        }

        self.terrain.heights[index] = to;
        out_events.push(Event::TileHeightChanged { cell, from, to });

        let size = self.terrain.size;
        for neighbor in cell.cardinal_neighbors(size, size) {
            let Some(neighbor_index) = self.terrain.index(neighbor) else {
                continue;
            };
            let previous = self.terrain.heights[neighbor_index];
            let smoothed = clamp_height(previous + (to - previous) * NEIGHBOR_SMOOTHING);
            if smoothed == previous {
                continue;
            }
            self.terrain.heights[neighbor_index] = smoothed;
            out_events.push(Event::TileHeightChanged {
                cell: neighbor,
                from: previous,
                to: smoothed,
            });
        }
    }

    fn set_tile_height(&mut self, cell: CellCoord, height: f32, out_events: &mut Vec<Event>) {
        if !height.is_finite() {
            return;
        }
        let Some(index) = self.terrain.index(cell) else {
            return;
        };

        let from = self.terrain.heights[index];
        let to = clamp_height(height);
        if to == from {
            return;
        }

        self.terrain.heights[index] = to;
        out_events.push(Event::TileHeightChanged { cell, from, to });
    }

    fn set_spawn_point(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if self.terrain.index(cell).is_none() {
            trace!(?cell, "spawn point outside grid ignored");
            return;
        }
        if cell == self.spawn_point || cell == self.exit_point {
            return;
        }

        let from = self.spawn_point;
        self.spawn_point = cell;
        self.refresh_buildable(from);
        self.refresh_buildable(cell);
        out_events.push(Event::SpawnPointMoved { from, to: cell });
    }

    fn set_exit_point(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if self.terrain.index(cell).is_none() {
            trace!(?cell, "exit point outside grid ignored");
            return;
        }
        if cell == self.exit_point || cell == self.spawn_point {
            return;
        }

        let from = self.exit_point;
        self.exit_point = cell;
        self.refresh_buildable(from);
        self.refresh_buildable(cell);
        out_events.push(Event::ExitPointMoved { from, to: cell });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that would not change anything, including every command that
/// targets a cell outside the grid, emit no events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PaintTile { cell, kind } => world.paint_tile(cell, kind, out_events),
        Command::AdjustHeight { cell, delta } => world.adjust_height(cell, delta, out_events),
        Command::SetTileHeight { cell, height } => world.set_tile_height(cell, height, out_events),
        Command::SetSpawnPoint { cell } => world.set_spawn_point(cell, out_events),
        Command::SetExitPoint { cell } => world.set_exit_point(cell, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cavern_defence_core::{CellCoord, GridState, TileSnapshot};

    use super::{TerrainView, World};

    /// Number of tiles along each edge of the square grid.
    #[must_use]
    pub fn grid_size(world: &World) -> u32 {
        world.terrain.size
    }

    /// Snapshot of the tile at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile_at(world: &World, cell: CellCoord) -> Option<TileSnapshot> {
        let index = world.terrain.index(cell)?;
        Some(TileSnapshot {
            kind: world.terrain.kinds[index],
            height: world.terrain.heights[index],
            buildable: world.terrain.buildable[index],
        })
    }

    /// Reports whether a tower could be placed on the cell.
    #[must_use]
    pub fn is_buildable(world: &World, cell: CellCoord) -> bool {
        world
            .terrain
            .index(cell)
            .is_some_and(|index| world.terrain.buildable[index])
    }

    /// Tile enemies spawn from.
    #[must_use]
    pub fn spawn_point(world: &World) -> CellCoord {
        world.spawn_point
    }

    /// Tile enemies walk toward.
    #[must_use]
    pub fn exit_point(world: &World) -> CellCoord {
        world.exit_point
    }

    /// Every spawner on the grid.
    #[must_use]
    pub fn spawners(world: &World) -> Vec<CellCoord> {
        vec![world.spawn_point]
    }

    /// Every exit on the grid.
    #[must_use]
    pub fn exits(world: &World) -> Vec<CellCoord> {
        vec![world.exit_point]
    }

    /// Read-only navigation view over the terrain.
    #[must_use]
    pub fn navigation(world: &World) -> TerrainView<'_> {
        TerrainView::new(world)
    }

    /// Serializable copy of the complete terrain.
    #[must_use]
    pub fn export_state(world: &World) -> GridState {
        super::state::export(world)
    }
}

#[derive(Clone, Debug)]
struct TerrainGrid {
    size: u32,
    kinds: Vec<TerrainKind>,
    heights: Vec<f32>,
    buildable: Vec<bool>,
}

impl TerrainGrid {
    fn new(size: u32) -> Self {
        let capacity_u64 = u64::from(size) * u64::from(size);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            size,
            kinds: vec![TerrainKind::default(); capacity],
            heights: vec![DEFAULT_TILE_HEIGHT; capacity],
            buildable: vec![true; capacity],
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.size && cell.row() < self.size {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
