#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy lifecycle system: spawning onto cached routes, per-tick movement and removal.
//!
//! Enemies follow the route assigned when they spawned. Routes are not
//! recomputed mid-flight, so terrain edited after a spawn only affects enemies
//! spawned later.

use std::collections::BTreeMap;

use cavern_defence_core::{CellCoord, EnemyId, EnemyKind, NavigationGrid, Route};
use cavern_defence_system_pathfinding::PathFinder;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, trace};

/// Configuration parameters required to construct the enemy manager.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration seeding spawner selection with `rng_seed`.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0x5eed_cafe_f00d_d00d)
    }
}

/// Reasons a spawn request may be rejected. None of them leave an enemy behind.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SpawnRejection {
    /// The layout contains no spawner.
    #[error("no spawner is available")]
    NoSpawner,
    /// The layout contains no exit.
    #[error("no exit is available")]
    NoExit,
    /// The chosen spawner cannot reach the exit.
    #[error("no route connects {spawner:?} to {exit:?}")]
    NoPath {
        /// Spawner the route was requested from.
        spawner: CellCoord,
        /// Exit the route was requested to.
        exit: CellCoord,
    },
}

/// Result of damaging an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The enemy survived with the remaining health.
    Survived {
        /// Health left after the hit.
        health: u32,
    },
    /// The enemy died and was removed from the live set.
    Killed {
        /// Currency awarded for the kill.
        value: u32,
    },
}

/// Position of a route node's centre in tile space.
#[must_use]
pub fn node_position(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.column() as f32, cell.row() as f32)
}

/// Owns every live enemy and advances them along their routes.
#[derive(Debug)]
pub struct EnemyManager {
    rng: ChaCha8Rng,
    enemies: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyManager {
    /// Creates an empty manager using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            enemies: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Spawns an enemy of `kind` on a uniformly chosen spawner, routed to the first exit.
    ///
    /// Routes come from `pathfinder`, so enemies spawned from the same spawner
    /// share one cached route.
    pub fn spawn<G>(
        &mut self,
        kind: EnemyKind,
        spawners: &[CellCoord],
        exits: &[CellCoord],
        pathfinder: &mut PathFinder,
        grid: &G,
    ) -> Result<EnemyId, SpawnRejection>
    where
        G: NavigationGrid + ?Sized,
    {
        if spawners.is_empty() {
            debug!(?kind, "spawn rejected: no spawner");
            return Err(SpawnRejection::NoSpawner);
        }
        let Some(&exit) = exits.first() else {
            debug!(?kind, "spawn rejected: no exit");
            return Err(SpawnRejection::NoExit);
        };

        let spawner = spawners[self.rng.gen_range(0..spawners.len())];
        let route = pathfinder.find_path(grid, spawner, exit);
        let Some(start) = route.get(0) else {
            debug!(?kind, ?spawner, ?exit, "spawn rejected: no route");
            return Err(SpawnRejection::NoPath { spawner, exit });
        };

        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let stats = kind.stats();
        let enemy = Enemy {
            id,
            kind,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            value: stats.value,
            route,
            path_index: 0,
            distance_traveled: 0.0,
            position: node_position(start),
        };
        trace!(enemy = id.get(), ?kind, ?spawner, "enemy spawned");
        let _ = self.enemies.insert(id, enemy);
        Ok(id)
    }

    /// Advances every enemy by `dt` seconds and returns the enemies standing on their exit.
    ///
    /// A single call may carry an enemy across several route nodes; only the
    /// distance actually covered is accumulated. Negative or non-finite `dt`
    /// moves nothing. Enemies that reached their exit stay in the live set
    /// until removed, and are reported again on every call.
    pub fn update(&mut self, dt: f32) -> Vec<EnemyId> {
        let mut reached = Vec::new();
        for enemy in self.enemies.values_mut() {
            if dt.is_finite() && dt > 0.0 {
                enemy.advance(enemy.speed * dt);
            }
            if enemy.at_exit() {
                reached.push(enemy.id);
            }
        }
        reached
    }

    /// Removes an enemy, returning its final snapshot. Unknown identifiers are ignored.
    pub fn remove_enemy(&mut self, id: EnemyId) -> Option<EnemySnapshot> {
        self.enemies.remove(&id).map(|enemy| enemy.snapshot())
    }

    /// Deals `amount` damage to an enemy, removing it when its health reaches zero.
    pub fn apply_damage(&mut self, id: EnemyId, amount: u32) -> Option<DamageOutcome> {
        let enemy = self.enemies.get_mut(&id)?;
        enemy.health = enemy.health.saturating_sub(amount);
        if enemy.health > 0 {
            return Some(DamageOutcome::Survived {
                health: enemy.health,
            });
        }

        let value = enemy.value;
        let _ = self.enemies.remove(&id);
        Some(DamageOutcome::Killed { value })
    }

    /// Snapshot of a single enemy.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<EnemySnapshot> {
        self.enemies.get(&id).map(Enemy::snapshot)
    }

    /// Captures a read-only view of every live enemy in identifier order.
    #[must_use]
    pub fn enemy_view(&self) -> EnemyView {
        EnemyView {
            snapshots: self.enemies.values().map(Enemy::snapshot).collect(),
        }
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Reports whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

impl Default for EnemyManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Stat profile the enemy spawned with.
    pub kind: EnemyKind,
    /// Remaining hit points.
    pub health: u32,
    /// Hit points the enemy spawned with.
    pub max_health: u32,
    /// Position in tile space.
    pub position: Vec2,
    /// Index of the last route node the enemy reached.
    pub path_index: usize,
    /// Total distance covered since spawning, in tiles.
    pub distance_traveled: f32,
    /// Route the enemy follows.
    pub route: Route,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    health: u32,
    max_health: u32,
    speed: f32,
    value: u32,
    route: Route,
    path_index: usize,
    distance_traveled: f32,
    position: Vec2,
}

impl Enemy {
    fn at_exit(&self) -> bool {
        self.path_index + 1 >= self.route.len()
    }

    fn advance(&mut self, move_distance: f32) {
        let mut budget = move_distance;
        while budget > 0.0 {
            let Some(next) = self.route.get(self.path_index + 1) else {
                break;
            };
            let target = node_position(next);
            let remaining = self.position.distance(target);

            if budget >= remaining {
                self.position = target;
                self.path_index += 1;
                self.distance_traveled += remaining;
                budget -= remaining;
            } else {
                let direction = (target - self.position) / remaining;
                self.position += direction * budget;
                self.distance_traveled += budget;
                budget = 0.0;
            }
        }
    }

    fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            health: self.health,
            max_health: self.max_health,
            position: self.position,
            path_index: self.path_index,
            distance_traveled: self.distance_traveled,
            route: self.route.clone(),
        }
    }
}
