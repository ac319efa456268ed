#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cavern Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative terrain world, and the simulation systems. Adapters submit
//! [`Command`] values describing desired terrain mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing exactly what changed. Systems such as the path finder and
//! the edit history react to those events and query immutable views; they
//! never reach into the world's storage directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Lowest height a tile may hold.
pub const MIN_TILE_HEIGHT: f32 = 0.0;

/// Highest height a tile may hold.
pub const MAX_TILE_HEIGHT: f32 = 5.0;

/// Height assigned to every tile of a freshly created grid.
pub const DEFAULT_TILE_HEIGHT: f32 = 1.0;

/// Fraction of the height difference applied to the four neighbours of a tile
/// whose height was adjusted.
pub const NEIGHBOR_SMOOTHING: f32 = 0.3;

/// Format version written into every exported [`GridState`].
pub const STATE_VERSION: &str = "1.0";

/// Clamps a height into the permitted `[MIN_TILE_HEIGHT, MAX_TILE_HEIGHT]` range.
#[must_use]
pub fn clamp_height(height: f32) -> f32 {
    if height.is_nan() {
        return MIN_TILE_HEIGHT;
    }
    height.clamp(MIN_TILE_HEIGHT, MAX_TILE_HEIGHT)
}

/// Commands that express all permissible terrain mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Changes the terrain kind of a single tile.
    PaintTile {
        /// Tile receiving the new terrain.
        cell: CellCoord,
        /// Terrain to paint onto the tile.
        kind: TerrainKind,
    },
    /// Raises or lowers a tile and smooths its four neighbours toward it.
    AdjustHeight {
        /// Tile whose height should change.
        cell: CellCoord,
        /// Signed amount added to the current height before clamping.
        delta: f32,
    },
    /// Sets the height of a single tile exactly, without neighbour smoothing.
    SetTileHeight {
        /// Tile whose height should change.
        cell: CellCoord,
        /// Height to store after clamping.
        height: f32,
    },
    /// Moves the enemy spawn point to the provided tile.
    SetSpawnPoint {
        /// Tile that becomes the spawn point.
        cell: CellCoord,
    },
    /// Moves the exit point to the provided tile.
    SetExitPoint {
        /// Tile that becomes the exit point.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a tile's terrain kind changed.
    TilePainted {
        /// Tile that was painted.
        cell: CellCoord,
        /// Terrain the tile held before the change.
        from: TerrainKind,
        /// Terrain the tile holds after the change.
        to: TerrainKind,
    },
    /// Confirms that a tile's height changed.
    TileHeightChanged {
        /// Tile whose height changed.
        cell: CellCoord,
        /// Height before the change.
        from: f32,
        /// Height after the change.
        to: f32,
    },
    /// Confirms that the spawn point moved.
    SpawnPointMoved {
        /// Previous spawn tile.
        from: CellCoord,
        /// New spawn tile.
        to: CellCoord,
    },
    /// Confirms that the exit point moved.
    ExitPointMoved {
        /// Previous exit tile.
        from: CellCoord,
        /// New exit tile.
        to: CellCoord,
    },
    /// Announces that the whole terrain was replaced by an imported state.
    TerrainReloaded,
}

impl Event {
    /// Reports whether the event describes a change to the terrain layout.
    #[must_use]
    pub const fn alters_terrain(&self) -> bool {
        matches!(
            self,
            Self::TilePainted { .. }
                | Self::TileHeightChanged { .. }
                | Self::SpawnPointMoved { .. }
                | Self::ExitPointMoved { .. }
                | Self::TerrainReloaded
        )
    }
}

/// Location of a single grid tile expressed as column (x) and row (z) indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(rename = "x")]
    column: u32,
    #[serde(rename = "z")]
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell, the x axis of the terrain.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, the z axis of the terrain.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Enumerates the in-bounds cells sharing an edge with this cell.
    ///
    /// Neighbours are yielded in north, east, south, west order.
    pub fn cardinal_neighbors(self, columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
        let mut candidates = [None; 4];
        let mut count = 0;

        if let Some(row) = self.row.checked_sub(1) {
            candidates[count] = Some(CellCoord::new(self.column, row));
            count += 1;
        }

        if let Some(column) = self.column.checked_add(1) {
            if column < columns {
                candidates[count] = Some(CellCoord::new(column, self.row));
                count += 1;
            }
        }

        if let Some(row) = self.row.checked_add(1) {
            if row < rows {
                candidates[count] = Some(CellCoord::new(self.column, row));
                count += 1;
            }
        }

        if let Some(column) = self.column.checked_sub(1) {
            candidates[count] = Some(CellCoord::new(column, self.row));
            count += 1;
        }

        candidates.into_iter().take(count).flatten()
    }
}

/// Axis-aligned rectangle of cells, inclusive of both corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRect {
    min: CellCoord,
    max: CellCoord,
}

impl CellRect {
    /// Builds the rectangle spanned by two arbitrary corner cells.
    #[must_use]
    pub fn from_corners(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min: CellCoord::new(a.column().min(b.column()), a.row().min(b.row())),
            max: CellCoord::new(a.column().max(b.column()), a.row().max(b.row())),
        }
    }

    /// Upper-left corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> CellCoord {
        self.min
    }

    /// Lower-right corner of the rectangle.
    #[must_use]
    pub const fn max(&self) -> CellCoord {
        self.max
    }

    /// Iterates every cell of the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.min.row()..=self.max.row()).flat_map(move |row| {
            (self.min.column()..=self.max.column()).map(move |column| CellCoord::new(column, row))
        })
    }
}

/// Kinds of terrain a tile may be painted with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Solid cave floor. Walkable and buildable.
    #[default]
    Bedrock,
    /// Mithril crystal outcrop. Blocks enemies and cannot be built on.
    MithrilCrystal,
    /// Glowing moss. Walkable but slow, and buildable.
    LuminousMoss,
    /// Bottomless pit. Blocks enemies and cannot be built on.
    Abyss,
}

impl TerrainKind {
    /// Every terrain kind in ordinal order.
    pub const ALL: [TerrainKind; 4] = [
        Self::Bedrock,
        Self::MithrilCrystal,
        Self::LuminousMoss,
        Self::Abyss,
    ];

    /// Stable ordinal used by the persisted tile matrix.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Bedrock => 0,
            Self::MithrilCrystal => 1,
            Self::LuminousMoss => 2,
            Self::Abyss => 3,
        }
    }

    /// Resolves a persisted ordinal, returning `None` for unknown values.
    #[must_use]
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Bedrock),
            1 => Some(Self::MithrilCrystal),
            2 => Some(Self::LuminousMoss),
            3 => Some(Self::Abyss),
            _ => None,
        }
    }

    /// Reports whether enemies may walk across the terrain.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        match self {
            Self::Bedrock | Self::LuminousMoss => true,
            Self::MithrilCrystal | Self::Abyss => false,
        }
    }

    /// Reports whether towers may be placed on the terrain, ignoring spawn and exit roles.
    #[must_use]
    pub const fn is_buildable(self) -> bool {
        match self {
            Self::Bedrock | Self::LuminousMoss => true,
            Self::MithrilCrystal | Self::Abyss => false,
        }
    }

    /// Cost of stepping onto a tile of this terrain under terrain-weighted pathing.
    #[must_use]
    pub const fn step_cost(self) -> u32 {
        match self {
            Self::LuminousMoss => 2,
            Self::Bedrock | Self::MithrilCrystal | Self::Abyss => 1,
        }
    }
}

/// Read-only snapshot of a single tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    /// Terrain painted on the tile.
    pub kind: TerrainKind,
    /// Height of the tile within `[MIN_TILE_HEIGHT, MAX_TILE_HEIGHT]`.
    pub height: f32,
    /// Whether a tower could be placed on the tile.
    pub buildable: bool,
}

/// Grid abstraction consumed by path finding.
pub trait NavigationGrid {
    /// Number of columns and rows in the grid.
    fn dimensions(&self) -> (u32, u32);

    /// Reports whether enemies may path through the cell.
    fn is_traversable(&self, cell: CellCoord) -> bool;

    /// Terrain-dependent cost of moving between two adjacent cells.
    ///
    /// Implementations must return at least one so Manhattan distance stays an
    /// admissible heuristic.
    fn terrain_cost(&self, from: CellCoord, to: CellCoord) -> u32 {
        let _ = (from, to);
        1
    }
}

/// Ordered, immutable list of cells from a spawn to an exit.
///
/// Routes are shared between the path cache and every enemy following them;
/// cloning only bumps a reference count and the nodes can never be mutated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    nodes: Arc<[CellCoord]>,
}

impl Route {
    /// Creates a route from an ordered node list.
    #[must_use]
    pub fn new(nodes: Vec<CellCoord>) -> Self {
        Self {
            nodes: Arc::from(nodes),
        }
    }

    /// Route without any nodes, signalling that no path exists.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Nodes of the route in travel order.
    #[must_use]
    pub fn nodes(&self) -> &[CellCoord] {
        &self.nodes
    }

    /// Number of nodes, counting both endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether the route has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at the provided index, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CellCoord> {
        self.nodes.get(index).copied()
    }

    /// Reports whether two routes point at the same shared node storage.
    #[must_use]
    pub fn shares_nodes_with(&self, other: &Route) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::empty()
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Visual appearance applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemyColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl EnemyColor {
    /// Creates a new enemy color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Stat profile shared by every enemy of a kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Hit points an enemy spawns with.
    pub health: u32,
    /// Movement speed in tiles per second.
    pub speed: f32,
    /// Currency awarded when the enemy is defeated.
    pub value: u32,
    /// Radius of the rendered body in tiles.
    pub size: f32,
    /// Rendered body color.
    pub color: EnemyColor,
}

/// Kinds of enemies that can be spawned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline walker.
    Crawler,
    /// Fast, fragile skirmisher.
    Skitter,
    /// Slow, heavily armoured brute.
    Golem,
}

impl EnemyKind {
    /// Every enemy kind.
    pub const ALL: [EnemyKind; 3] = [Self::Crawler, Self::Skitter, Self::Golem];

    /// Stat profile for the kind.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            Self::Crawler => EnemyStats {
                health: 100,
                speed: 2.0,
                value: 10,
                size: 0.3,
                color: EnemyColor::from_rgb(0xc8, 0x2a, 0x36),
            },
            Self::Skitter => EnemyStats {
                health: 60,
                speed: 4.0,
                value: 15,
                size: 0.25,
                color: EnemyColor::from_rgb(0xff, 0xc1, 0x07),
            },
            Self::Golem => EnemyStats {
                health: 300,
                speed: 1.0,
                value: 30,
                size: 0.5,
                color: EnemyColor::from_rgb(0x58, 0x47, 0xff),
            },
        }
    }
}

/// Serialized shape of a terrain grid used by the persistence collaborator.
///
/// `tiles` and `height_map` are indexed `[x][z]`. Both matrices may be ragged
/// or truncated; importers skip whatever is missing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridState {
    /// Edge length of the square grid.
    pub grid_size: u32,
    /// Terrain ordinals per tile.
    #[serde(default)]
    pub tiles: Vec<Vec<i64>>,
    /// Heights per tile.
    #[serde(default)]
    pub height_map: Vec<Vec<f32>>,
    /// Spawn tile, if recorded.
    #[serde(default)]
    pub spawn_point: Option<CellCoord>,
    /// Exit tile, if recorded.
    #[serde(default)]
    pub exit_point: Option<CellCoord>,
    /// Format version tag.
    #[serde(default = "current_version")]
    pub version: String,
}

fn current_version() -> String {
    STATE_VERSION.to_owned()
}
