//! Terrain edits and the editor handle they are applied through.

use std::collections::BTreeMap;

use cavern_defence_core::{CellCoord, Command, Event, TerrainKind};
use cavern_defence_world::{self as world, World};

use crate::{Composite, Edit};

/// Mutable handle terrain edits are applied through.
///
/// Every change goes through [`world::apply`], so undo and redo emit the same
/// events as the original edit and downstream caches stay in sync.
#[derive(Debug)]
pub struct WorldEditor<'a> {
    world: &'a mut World,
    events: &'a mut Vec<Event>,
}

impl<'a> WorldEditor<'a> {
    /// Wraps a world and the buffer receiving its events.
    pub fn new(world: &'a mut World, events: &'a mut Vec<Event>) -> Self {
        Self { world, events }
    }

    /// Read access to the edited world.
    #[must_use]
    pub fn world(&self) -> &World {
        &*self.world
    }

    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.events.as_slice()
    }

    /// Forwards a command to the world.
    pub fn apply(&mut self, command: Command) {
        world::apply(self.world, command, self.events);
    }
}

/// Repaint of one or more tiles with a single terrain kind.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintEdit {
    originals: Vec<(CellCoord, TerrainKind)>,
    kind: TerrainKind,
}

impl PaintEdit {
    /// Creates a paint edit from the tiles' kinds before painting.
    #[must_use]
    pub fn new(originals: Vec<(CellCoord, TerrainKind)>, kind: TerrainKind) -> Self {
        Self { originals, kind }
    }

    /// Painted tiles paired with the kind they held before.
    #[must_use]
    pub fn originals(&self) -> &[(CellCoord, TerrainKind)] {
        &self.originals
    }

    /// Kind painted onto every tile.
    #[must_use]
    pub const fn kind(&self) -> TerrainKind {
        self.kind
    }
}

/// Height change captured as exact before and after values per tile.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightEdit {
    originals: Vec<(CellCoord, f32)>,
    updated: BTreeMap<CellCoord, f32>,
}

impl HeightEdit {
    /// Creates a height edit. Cells missing from `updated` are left untouched on redo.
    #[must_use]
    pub fn new(originals: Vec<(CellCoord, f32)>, updated: BTreeMap<CellCoord, f32>) -> Self {
        Self { originals, updated }
    }

    /// Heights before the edit, including smoothed neighbours.
    #[must_use]
    pub fn originals(&self) -> &[(CellCoord, f32)] {
        &self.originals
    }

    /// Heights after the edit.
    #[must_use]
    pub fn updated(&self) -> &BTreeMap<CellCoord, f32> {
        &self.updated
    }
}

/// Relocation of the spawn or exit point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointEdit {
    previous: Option<CellCoord>,
    next: CellCoord,
}

impl PointEdit {
    /// Creates a point edit. Without a `previous` cell the edit cannot be undone.
    #[must_use]
    pub const fn new(previous: Option<CellCoord>, next: CellCoord) -> Self {
        Self { previous, next }
    }

    /// Cell the point occupied before the move.
    #[must_use]
    pub const fn previous(&self) -> Option<CellCoord> {
        self.previous
    }

    /// Cell the point moves to.
    #[must_use]
    pub const fn next(&self) -> CellCoord {
        self.next
    }
}

/// Undoable terrain editing command.
#[derive(Clone, Debug, PartialEq)]
pub enum TerrainEdit {
    /// Paints tiles with one terrain kind.
    Paint(PaintEdit),
    /// Changes tile heights.
    Height(HeightEdit),
    /// Moves the spawn point.
    SpawnPoint(PointEdit),
    /// Moves the exit point.
    ExitPoint(PointEdit),
    /// Several edits grouped into one undo step.
    Composite(Composite<TerrainEdit>),
}

impl<'a> Edit<WorldEditor<'a>> for TerrainEdit {
    fn redo(&self, editor: &mut WorldEditor<'a>) {
        match self {
            Self::Paint(paint) => {
                for &(cell, _) in &paint.originals {
                    editor.apply(Command::PaintTile {
                        cell,
                        kind: paint.kind,
                    });
                }
            }
            Self::Height(height) => {
                for (&cell, &value) in &height.updated {
                    editor.apply(Command::SetTileHeight {
                        cell,
                        height: value,
                    });
                }
            }
            Self::SpawnPoint(point) => editor.apply(Command::SetSpawnPoint { cell: point.next }),
            Self::ExitPoint(point) => editor.apply(Command::SetExitPoint { cell: point.next }),
            Self::Composite(group) => group.redo(editor),
        }
    }

    fn undo(&self, editor: &mut WorldEditor<'a>) {
        match self {
            Self::Paint(paint) => {
                for &(cell, kind) in paint.originals.iter().rev() {
                    editor.apply(Command::PaintTile { cell, kind });
                }
            }
            Self::Height(height) => {
                for &(cell, value) in height.originals.iter().rev() {
                    editor.apply(Command::SetTileHeight {
                        cell,
                        height: value,
                    });
                }
            }
            Self::SpawnPoint(point) => {
                if let Some(cell) = point.previous {
                    editor.apply(Command::SetSpawnPoint { cell });
                }
            }
            Self::ExitPoint(point) => {
                if let Some(cell) = point.previous {
                    editor.apply(Command::SetExitPoint { cell });
                }
            }
            Self::Composite(group) => group.undo(editor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_defence_world::query;

    #[test]
    fn paint_edit_restores_each_original_kind() {
        let mut world = World::with_grid_size(4);
        let mut events = Vec::new();
        let a = CellCoord::new(1, 1);
        let b = CellCoord::new(2, 1);
        world::apply(
            &mut world,
            Command::PaintTile {
                cell: b,
                kind: TerrainKind::LuminousMoss,
            },
            &mut events,
        );
        let edit = TerrainEdit::Paint(PaintEdit::new(
            vec![(a, TerrainKind::Bedrock), (b, TerrainKind::LuminousMoss)],
            TerrainKind::Abyss,
        ));

        let mut editor = WorldEditor::new(&mut world, &mut events);
        edit.redo(&mut editor);
        edit.undo(&mut editor);

        let kind_at = |cell| query::tile_at(&world, cell).map(|tile| tile.kind);
        assert_eq!(kind_at(a), Some(TerrainKind::Bedrock));
        assert_eq!(kind_at(b), Some(TerrainKind::LuminousMoss));
    }

    #[test]
    fn point_undo_without_previous_is_a_no_op() {
        let mut world = World::with_grid_size(4);
        let mut events = Vec::new();
        let target = CellCoord::new(0, 0);
        let edit = TerrainEdit::SpawnPoint(PointEdit::new(None, target));

        let mut editor = WorldEditor::new(&mut world, &mut events);
        edit.redo(&mut editor);
        let emitted = editor.events().len();
        edit.undo(&mut editor);

        assert_eq!(editor.events().len(), emitted);
        assert_eq!(query::spawn_point(&world), target);
    }

    #[test]
    fn undo_emits_world_events() {
        let mut world = World::with_grid_size(4);
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 2);
        let edit = TerrainEdit::Height(HeightEdit::new(
            vec![(cell, 1.0)],
            BTreeMap::from([(cell, 3.0)]),
        ));

        let mut editor = WorldEditor::new(&mut world, &mut events);
        edit.redo(&mut editor);
        edit.undo(&mut editor);

        assert_eq!(
            events,
            vec![
                Event::TileHeightChanged {
                    cell,
                    from: 1.0,
                    to: 3.0
                },
                Event::TileHeightChanged {
                    cell,
                    from: 3.0,
                    to: 1.0
                },
            ]
        );
    }
}
