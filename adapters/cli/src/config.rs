//! Simulation settings read from an optional TOML file.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use cavern_defence_core::EnemyKind;
use cavern_defence_system_pathfinding::CostModel;
use clap::ValueEnum;
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Enemy kinds the simulation can spawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum EnemyChoice {
    /// Only crawlers.
    #[default]
    Crawler,
    /// Only skitters.
    Skitter,
    /// Only golems.
    Golem,
    /// Cycle through every kind in turn.
    Mixed,
}

impl EnemyChoice {
    /// Kind of the `wave`-th spawned enemy.
    pub(crate) fn kind_for(self, wave: usize) -> EnemyKind {
        match self {
            Self::Crawler => EnemyKind::Crawler,
            Self::Skitter => EnemyKind::Skitter,
            Self::Golem => EnemyKind::Golem,
            Self::Mixed => EnemyKind::ALL[wave % EnemyKind::ALL.len()],
        }
    }
}

/// Edge weighting used by the route planner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum CostChoice {
    /// One per step.
    #[default]
    Uniform,
    /// Terrain step cost plus height climb.
    Weighted,
}

impl From<CostChoice> for CostModel {
    fn from(choice: CostChoice) -> Self {
        match choice {
            CostChoice::Uniform => CostModel::Uniform,
            CostChoice::Weighted => CostModel::TerrainWeighted,
        }
    }
}

/// Parameters of a headless simulation run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    /// Format version of the file.
    pub(crate) version: u32,
    /// Edge length of the generated grid when no map is loaded.
    pub(crate) grid_size: u32,
    /// Seed for spawner selection.
    pub(crate) seed: u64,
    /// Simulated seconds per tick.
    pub(crate) tick_seconds: f32,
    /// Number of ticks to run.
    pub(crate) ticks: u32,
    /// Ticks between consecutive spawns.
    pub(crate) spawn_interval: u32,
    /// Kinds of enemy to spawn.
    pub(crate) enemy: EnemyChoice,
    /// Edge weighting for routes.
    pub(crate) cost_model: CostChoice,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            grid_size: cavern_defence_world::DEFAULT_GRID_SIZE,
            seed: 0x5eed,
            tick_seconds: 1.0 / 60.0,
            ticks: 1_800,
            spawn_interval: 60,
            enemy: EnemyChoice::default(),
            cost_model: CostChoice::default(),
        }
    }
}

impl SimulationConfig {
    /// Reads the configuration from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid simulation config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse simulation config toml contents")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the simulation cannot run with.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            bail!(
                "unsupported simulation config version {}; expected {}",
                self.version,
                SUPPORTED_CONFIG_VERSION
            );
        }
        crate::maps::check_grid_size(self.grid_size)?;
        if !self.tick_seconds.is_finite() || self.tick_seconds <= 0.0 {
            bail!("tick_seconds must be a positive number, got {}", self.tick_seconds);
        }
        if self.spawn_interval == 0 {
            bail!("spawn_interval must be at least one tick");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = SimulationConfig::parse("").expect("parses");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = SimulationConfig::parse(
            r#"
                grid_size = 12
                seed = 42
                enemy = "mixed"
                cost_model = "weighted"
            "#,
        )
        .expect("parses");

        assert_eq!(config.grid_size, 12);
        assert_eq!(config.seed, 42);
        assert_eq!(config.enemy, EnemyChoice::Mixed);
        assert_eq!(config.cost_model, CostChoice::Weighted);
        assert_eq!(config.ticks, SimulationConfig::default().ticks);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let error = SimulationConfig::parse("version = 2").expect_err("rejected");
        assert!(error.to_string().contains("unsupported simulation config version"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(SimulationConfig::parse("tick_rate = 5").is_err());
    }

    #[test]
    fn zero_spawn_interval_is_rejected() {
        assert!(SimulationConfig::parse("spawn_interval = 0").is_err());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert!(SimulationConfig::parse("grid_size = 4000000000").is_err());
    }

    #[test]
    fn mixed_waves_cycle_through_kinds() {
        let kinds: Vec<_> = (0..4).map(|wave| EnemyChoice::Mixed.kind_for(wave)).collect();
        assert_eq!(
            kinds,
            vec![
                EnemyKind::Crawler,
                EnemyKind::Skitter,
                EnemyKind::Golem,
                EnemyKind::Crawler
            ]
        );
    }
}
