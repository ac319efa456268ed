//! Headless simulation driver.

use cavern_defence_system_enemies::{self as enemies, EnemyManager};
use cavern_defence_system_pathfinding::{self as pathfinding, PathFinder};
use cavern_defence_world::{query, World};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;

/// Totals gathered over a simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct SimulationReport {
    /// Enemies successfully spawned.
    pub(crate) spawned: u32,
    /// Spawn attempts that were rejected.
    pub(crate) rejected: u32,
    /// Enemies that reached the exit and were removed.
    pub(crate) escaped: u32,
    /// Enemies still walking when the run ended.
    pub(crate) remaining: usize,
    /// Simulated time in seconds.
    pub(crate) elapsed_seconds: f32,
}

/// Spawns enemies on a fixed interval and ticks them until the configured tick count.
///
/// The world is read-only during the run, so the route cache never needs invalidating.
pub(crate) fn run(world: &World, config: &SimulationConfig) -> SimulationReport {
    let mut pathfinder = PathFinder::new(pathfinding::Config::new(config.cost_model.into()));
    let mut manager = EnemyManager::new(enemies::Config::new(config.seed));
    let spawners = query::spawners(world);
    let exits = query::exits(world);
    let grid = query::navigation(world);

    let mut report = SimulationReport::default();
    let mut waves = 0;
    for tick in 0..config.ticks {
        if tick % config.spawn_interval == 0 {
            let kind = config.enemy.kind_for(waves);
            waves += 1;
            match manager.spawn(kind, &spawners, &exits, &mut pathfinder, &grid) {
                Ok(id) => {
                    report.spawned += 1;
                    debug!(tick, enemy = id.get(), ?kind, "enemy spawned");
                }
                Err(rejection) => {
                    report.rejected += 1;
                    warn!(tick, ?kind, %rejection, "spawn rejected");
                }
            }
        }

        for id in manager.update(config.tick_seconds) {
            if let Some(enemy) = manager.remove_enemy(id) {
                report.escaped += 1;
                info!(
                    tick,
                    enemy = id.get(),
                    kind = ?enemy.kind,
                    distance = enemy.distance_traveled,
                    "enemy reached the exit"
                );
            }
        }
    }

    report.remaining = manager.len();
    report.elapsed_seconds = config.ticks as f32 * config.tick_seconds;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnemyChoice;
    use cavern_defence_core::{CellCoord, Command, TerrainKind};
    use cavern_defence_world as world;

    fn short_run() -> SimulationConfig {
        SimulationConfig {
            grid_size: 10,
            ticks: 600,
            spawn_interval: 60,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn crawlers_cross_an_open_grid() {
        let world = World::with_grid_size(10);
        let report = run(&world, &short_run());

        assert_eq!(report.spawned, 10);
        assert_eq!(report.rejected, 0);
        assert!(report.escaped >= 5);
        assert_eq!(report.escaped as usize + report.remaining, 10);
    }

    #[test]
    fn sealed_exit_rejects_every_spawn() {
        let mut world = World::with_grid_size(10);
        let mut events = Vec::new();
        for row in 0..10 {
            world::apply(
                &mut world,
                Command::PaintTile {
                    cell: CellCoord::new(5, row),
                    kind: TerrainKind::Abyss,
                },
                &mut events,
            );
        }

        let report = run(&world, &short_run());

        assert_eq!(report.spawned, 0);
        assert_eq!(report.rejected, 10);
        assert_eq!(report.remaining, 0);
    }

    #[test]
    fn identical_configs_replay_identically() {
        let world = World::with_grid_size(10);
        let config = SimulationConfig {
            enemy: EnemyChoice::Mixed,
            ..short_run()
        };

        assert_eq!(run(&world, &config), run(&world, &config));
    }
}
