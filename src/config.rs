use crate::engine::{Propagation, SimParams};
use crate::model::Pathogen;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration.
///
/// Loaded from a TOML file and validated before use. Every section and
/// field falls back to its default, so an empty file is a valid config.
/// See [`Config::from_file`] for loading.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub world: WorldConfig,
    pub agent: AgentConfig,
    pub infection: InfectionConfig,
    pub index: IndexConfig,
    pub output: OutputConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// World width (an 800 wide window minus two 50 margins).
    pub width: f64,
    /// World height (a 600 high window minus two 50 margins).
    pub height: f64,
    /// Number of agents.
    pub n_agents: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 500.0,
            n_agents: 200,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Agent radius.
    pub radius: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            radius: crate::model::DEFAULT_RADIUS,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfectionConfig {
    /// Display tag of the infection.
    pub tag: String,
    /// Maximum infection duration in ticks (inclusive).
    pub max_duration: u32,
}

impl Default for InfectionConfig {
    fn default() -> Self {
        let pathogen = Pathogen::default();
        Self {
            tag: pathogen.tag,
            max_duration: pathogen.max_duration,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Edge length of a spatial index cell.
    pub cell_size: f64,
    /// Neighbor search used to spread infections.
    pub propagation: Propagation,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cell_size: crate::spatial::DEFAULT_CELL_SIZE,
            propagation: Propagation::default(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Number of ticks between progress log lines.
    pub ticks_per_log: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { ticks_per_log: 100 }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;
        config.validate().context("failed to validate config")?;
        Ok(config)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        check_num(self.world.width, 1.0..1e6).context("invalid world width")?;
        check_num(self.world.height, 1.0..1e6).context("invalid world height")?;
        check_num(self.world.n_agents, 0..100_000).context("invalid number of agents")?;

        check_num(self.agent.radius, 2.0..=100.0).context("invalid agent radius")?;
        let diameter = 2.0 * self.agent.radius;
        if self.world.width < diameter || self.world.height < diameter {
            bail!("world must be at least one agent diameter ({diameter}) wide and high");
        }

        if self.infection.tag.is_empty() {
            bail!("infection tag must not be empty");
        }
        check_num(self.infection.max_duration, 0..=1_000_000)
            .context("invalid maximum infection duration")?;

        check_num(self.index.cell_size, 1.0..1e6).context("invalid cell size")?;

        check_num(self.output.ticks_per_log, 1..=1_000_000)
            .context("invalid number of ticks per log")?;

        Ok(())
    }

    /// Core simulation parameters described by this config.
    pub fn sim_params(&self) -> SimParams {
        SimParams {
            radius: self.agent.radius,
            cell_size: self.index.cell_size,
            pathogen: Pathogen {
                tag: self.infection.tag.clone(),
                max_duration: self.infection.max_duration,
            },
        }
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
