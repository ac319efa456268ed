//! Export and import of the serialized terrain state.

use cavern_defence_core::{clamp_height, CellCoord, Event, GridState, TerrainKind, STATE_VERSION};
use thiserror::Error;
use tracing::debug;

use crate::World;

/// Reasons an imported state may be rejected. Rejected imports leave the world untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    /// The state describes a grid of a different size than the live world.
    #[error("grid size {found} does not match the live grid size {expected}")]
    GridSizeMismatch {
        /// Size of the live grid.
        expected: u32,
        /// Size declared by the imported state.
        found: u32,
    },
    /// The state was written by an incompatible format version.
    #[error("state version '{0}' is not supported")]
    UnsupportedVersion(String),
}

pub(crate) fn export(world: &World) -> GridState {
    let size = world.terrain.size;
    let mut tiles = Vec::with_capacity(size as usize);
    let mut height_map = Vec::with_capacity(size as usize);

    for column in 0..size {
        let mut tile_column = Vec::with_capacity(size as usize);
        let mut height_column = Vec::with_capacity(size as usize);
        for row in 0..size {
            let Some(index) = world.terrain.index(CellCoord::new(column, row)) else {
                continue;
            };
            tile_column.push(i64::from(world.terrain.kinds[index].ordinal()));
            height_column.push(world.terrain.heights[index]);
        }
        tiles.push(tile_column);
        height_map.push(height_column);
    }

    GridState {
        grid_size: size,
        tiles,
        height_map,
        spawn_point: Some(world.spawn_point),
        exit_point: Some(world.exit_point),
        version: STATE_VERSION.to_owned(),
    }
}

/// Replaces the world's terrain with the provided state.
///
/// The state is validated before anything is written, so a rejected import
/// never applies partially. Missing rows, missing cells, unknown terrain
/// ordinals and out-of-range points are skipped and keep their current values.
/// A successful import emits [`Event::TerrainReloaded`].
pub fn import_state(
    world: &mut World,
    state: &GridState,
    out_events: &mut Vec<Event>,
) -> Result<(), ImportError> {
    let expected = world.terrain.size;
    if state.grid_size != expected {
        debug!(expected, found = state.grid_size, "rejected terrain import");
        return Err(ImportError::GridSizeMismatch {
            expected,
            found: state.grid_size,
        });
    }
    if !is_supported_version(&state.version) {
        debug!(version = %state.version, "rejected terrain import");
        return Err(ImportError::UnsupportedVersion(state.version.clone()));
    }

    for (column, tile_column) in (0..expected).zip(&state.tiles) {
        for (row, &ordinal) in (0..expected).zip(tile_column) {
            let Some(kind) = TerrainKind::from_ordinal(ordinal) else {
                continue;
            };
            if let Some(index) = world.terrain.index(CellCoord::new(column, row)) {
                world.terrain.kinds[index] = kind;
            }
        }
    }

    for (column, height_column) in (0..expected).zip(&state.height_map) {
        for (row, &height) in (0..expected).zip(height_column) {
            if !height.is_finite() {
                continue;
            }
            if let Some(index) = world.terrain.index(CellCoord::new(column, row)) {
                world.terrain.heights[index] = clamp_height(height);
            }
        }
    }

    let in_bounds =
        |point: Option<CellCoord>| point.filter(|cell| world.terrain.index(*cell).is_some());
    let spawn = in_bounds(state.spawn_point).unwrap_or(world.spawn_point);
    let exit = in_bounds(state.exit_point).unwrap_or(world.exit_point);
    if spawn != exit {
        world.spawn_point = spawn;
        world.exit_point = exit;
    }

    world.refresh_all_buildable();
    out_events.push(Event::TerrainReloaded);
    Ok(())
}

fn is_supported_version(version: &str) -> bool {
    let supported_major = STATE_VERSION.split('.').next();
    version.split('.').next() == supported_major
}
