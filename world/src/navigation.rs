//! Navigation view exposing terrain traversability to path finding.

use cavern_defence_core::{CellCoord, NavigationGrid};

use crate::World;

/// Read-only view of the terrain as a navigation grid.
///
/// Traversability is a pure terrain property; the spawn and exit roles do not
/// block movement. Step costs charge the entered tile's terrain cost plus the
/// height climbed or descended, rounded to whole tiles.
#[derive(Clone, Copy, Debug)]
pub struct TerrainView<'a> {
    world: &'a World,
}

impl<'a> TerrainView<'a> {
    pub(crate) fn new(world: &'a World) -> Self {
        Self { world }
    }
}

impl NavigationGrid for TerrainView<'_> {
    fn dimensions(&self) -> (u32, u32) {
        let size = self.world.terrain.size;
        (size, size)
    }

    fn is_traversable(&self, cell: CellCoord) -> bool {
        self.world
            .terrain
            .index(cell)
            .is_some_and(|index| self.world.terrain.kinds[index].is_traversable())
    }

    fn terrain_cost(&self, from: CellCoord, to: CellCoord) -> u32 {
        let terrain = &self.world.terrain;
        let (Some(from_index), Some(to_index)) = (terrain.index(from), terrain.index(to)) else {
            return 1;
        };

        let climb = (terrain.heights[to_index] - terrain.heights[from_index]).abs();
        let climb_cost = climb.round() as u32;
        terrain.kinds[to_index].step_cost().max(1) + climb_cost
    }
}
