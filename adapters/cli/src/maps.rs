//! Loading and writing terrain maps on disk.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use cavern_defence_core::GridState;
use cavern_defence_world::{self as world, query, World, MAX_GRID_SIZE, MIN_GRID_SIZE};
use clap::ValueEnum;
use tracing::info;

use crate::map_transfer;

/// Text encodings a map can be exported as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    /// Pretty-printed JSON document.
    #[default]
    Json,
    /// Single-line `cavern:v1` share code.
    Code,
}

/// Builds the world described by `path`, or a fresh grid of `grid_size` when no path is given.
///
/// The file may hold either a JSON document or a share code.
pub(crate) fn load_world(path: Option<&Path>, grid_size: u32) -> Result<World> {
    let Some(path) = path else {
        check_grid_size(grid_size)?;
        return Ok(World::with_grid_size(grid_size));
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read map at {}", path.display()))?;
    let state = parse_state(&contents)
        .with_context(|| format!("failed to parse map at {}", path.display()))?;

    check_grid_size(state.grid_size)
        .with_context(|| format!("map at {} was rejected", path.display()))?;
    let mut world = World::with_grid_size(state.grid_size);
    let mut events = Vec::new();
    world::import_state(&mut world, &state, &mut events)
        .with_context(|| format!("map at {} was rejected", path.display()))?;
    info!(
        path = %path.display(),
        grid_size = query::grid_size(&world),
        "map loaded"
    );
    Ok(world)
}

/// Rejects grid edges a world cannot be built with.
pub(crate) fn check_grid_size(grid_size: u32) -> Result<()> {
    ensure!(
        (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size),
        "grid size {grid_size} is outside {MIN_GRID_SIZE}..={MAX_GRID_SIZE}"
    );
    Ok(())
}

fn parse_state(contents: &str) -> Result<GridState> {
    if map_transfer::is_share_code(contents) {
        return map_transfer::decode(contents).context("invalid share code");
    }
    serde_json::from_str(contents).context("invalid map json")
}

/// Renders the world in the requested format.
pub(crate) fn render(world: &World, format: ExportFormat) -> Result<String> {
    let state = query::export_state(world);
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(&state).context("failed to serialise map json")
        }
        ExportFormat::Code => map_transfer::encode(&state).context("failed to encode share code"),
    }
}
