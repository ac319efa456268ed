use cavern_defence_core::{CellCoord, Command, Event, NavigationGrid, Route, TerrainKind};
use cavern_defence_system_pathfinding::{search, Config, CostModel, PathFinder};
use cavern_defence_world::{self as world, query, World};
use proptest::prelude::*;

fn paint(world: &mut World, cells: &[CellCoord], kind: TerrainKind) -> Vec<Event> {
    let mut events = Vec::new();
    for &cell in cells {
        world::apply(world, Command::PaintTile { cell, kind }, &mut events);
    }
    events
}

fn assert_unit_steps(route: &Route) {
    for pair in route.nodes().windows(2) {
        assert_eq!(
            pair[0].manhattan_distance(pair[1]),
            1,
            "route jumped from {:?} to {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn open_grid_route_matches_manhattan_distance() {
    let world = World::with_grid_size(10);
    let mut finder = PathFinder::default();
    let start = CellCoord::new(0, 0);
    let end = CellCoord::new(9, 9);

    let route = finder.find_path(&query::navigation(&world), start, end);

    assert_eq!(route.len(), 19);
    assert_eq!(route.get(0), Some(start));
    assert_eq!(route.get(18), Some(end));
    assert_unit_steps(&route);
}

#[test]
fn obstacles_lengthen_route_and_are_avoided() {
    let mut world = World::with_grid_size(10);
    let start = query::spawn_point(&world);
    let end = query::exit_point(&world);
    let open_length = search(&query::navigation(&world), start, end, CostModel::Uniform).len();

    let wall: Vec<_> = (1..10).map(|row| CellCoord::new(5, row)).collect();
    let _ = paint(&mut world, &wall, TerrainKind::MithrilCrystal);

    let route = search(&query::navigation(&world), start, end, CostModel::Uniform);

    assert!(!route.is_empty());
    assert!(route.len() > open_length);
    assert!(route.nodes().iter().all(|cell| !wall.contains(cell)));
    assert_unit_steps(&route);
}

#[test]
fn sealed_exit_yields_empty_route() {
    let mut world = World::with_grid_size(8);
    let start = query::spawn_point(&world);
    let end = query::exit_point(&world);
    let wall: Vec<_> = (0..8).map(|row| CellCoord::new(4, row)).collect();
    let _ = paint(&mut world, &wall, TerrainKind::Abyss);

    let mut finder = PathFinder::default();
    assert!(finder.find_path(&query::navigation(&world), start, end).is_empty());
}

#[test]
fn exit_is_reachable_even_when_its_terrain_blocks() {
    let mut world = World::with_grid_size(6);
    let start = query::spawn_point(&world);
    let end = query::exit_point(&world);
    let _ = paint(&mut world, &[end], TerrainKind::MithrilCrystal);

    let route = search(&query::navigation(&world), start, end, CostModel::Uniform);

    assert_eq!(route.len(), 6);
    assert_eq!(route.get(5), Some(end));
}

#[test]
fn cached_routes_are_reused_until_cleared() {
    let mut world = World::with_grid_size(10);
    let start = query::spawn_point(&world);
    let end = query::exit_point(&world);
    let mut finder = PathFinder::default();

    let first = finder.find_path(&query::navigation(&world), start, end);
    let second = finder.find_path(&query::navigation(&world), start, end);
    assert_eq!(first, second);
    assert!(first.shares_nodes_with(&second));
    assert_eq!(finder.cached_routes(), 1);

    let wall: Vec<_> = (1..10).map(|row| CellCoord::new(5, row)).collect();
    let _ = paint(&mut world, &wall, TerrainKind::MithrilCrystal);

    let stale = finder.find_path(&query::navigation(&world), start, end);
    assert_eq!(stale, first, "cache is only invalidated explicitly");

    finder.clear_cache();
    let fresh = finder.find_path(&query::navigation(&world), start, end);
    assert!(fresh.len() > first.len());
}

#[test]
fn terrain_events_invalidate_cache() {
    let mut world = World::with_grid_size(10);
    let start = query::spawn_point(&world);
    let end = query::exit_point(&world);
    let mut finder = PathFinder::default();
    let before = finder.find_path(&query::navigation(&world), start, end);

    let wall: Vec<_> = (1..10).map(|row| CellCoord::new(5, row)).collect();
    let events = paint(&mut world, &wall, TerrainKind::MithrilCrystal);
    finder.handle(&events);

    assert_eq!(finder.cached_routes(), 0);
    let after = finder.find_path(&query::navigation(&world), start, end);
    assert!(after.len() > before.len());
}

#[test]
fn no_op_edits_keep_cache() {
    let mut world = World::with_grid_size(6);
    let mut finder = PathFinder::default();
    let _ = finder.find_path(
        &query::navigation(&world),
        query::spawn_point(&world),
        query::exit_point(&world),
    );

    let events = paint(&mut world, &[CellCoord::new(1, 1)], TerrainKind::Bedrock);
    finder.handle(&events);

    assert!(events.is_empty());
    assert_eq!(finder.cached_routes(), 1);
}

#[test]
fn weighted_search_detours_around_moss() {
    let mut world = World::with_grid_size(7);
    let start = CellCoord::new(0, 3);
    let end = CellCoord::new(6, 3);
    let moss: Vec<_> = (1..6).map(|column| CellCoord::new(column, 3)).collect();
    let _ = paint(&mut world, &moss, TerrainKind::LuminousMoss);

    let uniform = search(&query::navigation(&world), start, end, CostModel::Uniform);
    let weighted = search(&query::navigation(&world), start, end, CostModel::TerrainWeighted);

    assert_eq!(uniform.len(), 7);
    assert!(weighted.nodes().iter().all(|cell| !moss.contains(cell)));
    assert_unit_steps(&weighted);

    let mut finder = PathFinder::new(Config::new(CostModel::TerrainWeighted));
    assert_eq!(finder.find_path(&query::navigation(&world), start, end), weighted);
}

struct MaskGrid {
    size: u32,
    blocked: Vec<bool>,
}

impl NavigationGrid for MaskGrid {
    fn dimensions(&self) -> (u32, u32) {
        (self.size, self.size)
    }

    fn is_traversable(&self, cell: CellCoord) -> bool {
        let index = (cell.row() * self.size + cell.column()) as usize;
        !self.blocked.get(index).copied().unwrap_or(true)
    }
}

proptest! {
    #[test]
    fn routes_are_contiguous_and_avoid_blocked_cells(
        blocked in proptest::collection::vec(proptest::bool::weighted(0.25), 64),
        start in (0u32..8, 0u32..8),
        end in (0u32..8, 0u32..8),
    ) {
        let grid = MaskGrid { size: 8, blocked };
        let start = CellCoord::new(start.0, start.1);
        let end = CellCoord::new(end.0, end.1);

        let route = search(&grid, start, end, CostModel::Uniform);
        if !route.is_empty() {
            prop_assert_eq!(route.get(0), Some(start));
            prop_assert_eq!(route.get(route.len() - 1), Some(end));
            prop_assert!(route.len() as u32 >= start.manhattan_distance(end) + 1);
            for pair in route.nodes().windows(2) {
                prop_assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
            }
            let interior = route.nodes().iter().skip(1).take(route.len().saturating_sub(2));
            for cell in interior {
                prop_assert!(grid.is_traversable(*cell));
            }
        }
    }
}
