//! Builders turning brush gestures into undoable [`TerrainEdit`]s.
//!
//! Paint and point helpers inspect the world and return an edit to pass to
//! [`History::execute`](crate::History::execute). Height strokes apply
//! themselves while capturing the exact values they changed, and the returned
//! edit goes to [`History::record`](crate::History::record). Every helper
//! returns `None` when the gesture would change nothing.

use std::collections::{BTreeMap, BTreeSet};

use cavern_defence_core::{CellCoord, CellRect, Command, Event, TerrainKind};
use cavern_defence_world::{query, World};
use tracing::trace;

use crate::{Composite, HeightEdit, PaintEdit, PointEdit, TerrainEdit, WorldEditor};

/// Paint edit covering every in-bounds cell of a stroke that does not already hold `kind`.
///
/// Cells visited more than once by the stroke are captured once.
pub fn paint_stroke<I>(world: &World, cells: I, kind: TerrainKind) -> Option<TerrainEdit>
where
    I: IntoIterator<Item = CellCoord>,
{
    let mut seen = BTreeSet::new();
    let originals: Vec<_> = cells
        .into_iter()
        .filter(|cell| seen.insert(*cell))
        .filter_map(|cell| query::tile_at(world, cell).map(|tile| (cell, tile.kind)))
        .filter(|&(_, original)| original != kind)
        .collect();

    if originals.is_empty() {
        return None;
    }
    Some(TerrainEdit::Paint(PaintEdit::new(originals, kind)))
}

/// Rectangle fill grouped as one composite of single-tile paints.
pub fn fill_rect(world: &World, rect: CellRect, kind: TerrainKind) -> Option<TerrainEdit> {
    let tiles: Vec<_> = rect
        .cells()
        .filter_map(|cell| paint_stroke(world, [cell], kind))
        .collect();

    if tiles.is_empty() {
        return None;
    }
    trace!(tiles = tiles.len(), ?kind, "rectangle fill captured");
    Some(TerrainEdit::Composite(Composite::new(tiles)))
}

/// Adjusts the height of every cell in the stroke and captures the result.
///
/// The world is already modified when this returns. Smoothed neighbours are
/// captured alongside the stroked cells so undo restores them exactly.
pub fn height_stroke<I>(editor: &mut WorldEditor<'_>, cells: I, delta: f32) -> Option<TerrainEdit>
where
    I: IntoIterator<Item = CellCoord>,
{
    let first_event = editor.events().len();
    for cell in cells {
        editor.apply(Command::AdjustHeight { cell, delta });
    }

    let mut originals = Vec::new();
    let mut updated = BTreeMap::new();
    for event in &editor.events()[first_event..] {
        if let Event::TileHeightChanged { cell, from, to } = *event {
            if !updated.contains_key(&cell) {
                originals.push((cell, from));
            }
            let _ = updated.insert(cell, to);
        }
    }

    if originals.is_empty() {
        return None;
    }
    Some(TerrainEdit::Height(HeightEdit::new(originals, updated)))
}

/// Spawn point relocation, or `None` when `cell` is outside the grid, already the
/// spawn point, or occupied by the exit.
pub fn move_spawn_point(world: &World, cell: CellCoord) -> Option<TerrainEdit> {
    let current = query::spawn_point(world);
    relocation(world, current, query::exit_point(world), cell).map(TerrainEdit::SpawnPoint)
}

/// Exit point relocation, or `None` when `cell` is outside the grid, already the
/// exit point, or occupied by the spawn point.
pub fn move_exit_point(world: &World, cell: CellCoord) -> Option<TerrainEdit> {
    let current = query::exit_point(world);
    relocation(world, current, query::spawn_point(world), cell).map(TerrainEdit::ExitPoint)
}

fn relocation(
    world: &World,
    current: CellCoord,
    other: CellCoord,
    cell: CellCoord,
) -> Option<PointEdit> {
    if query::tile_at(world, cell).is_none() || cell == current || cell == other {
        return None;
    }
    Some(PointEdit::new(Some(current), cell))
}
