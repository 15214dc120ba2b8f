//! Run configuration loaded from `config.toml`.
//!
//! Strongly-typed configuration structures with hardcoded defaults; a
//! config file overrides the defaults section by section. The runner
//! copies the loaded settings onto the engine's value store before the
//! first generation.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [run]
//! generations = 50
//! seed = 42
//!
//! [population]
//! size = 30
//! preserved_parents = 2
//!
//! [execution]
//! tries = 2
//! steps = 100
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level run parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RunSettings {
    pub generations: u64,
    pub seed: u64,
    pub realtime: bool,
    /// Simulated seconds per step; the pacing interval in real-time mode.
    pub time_step_size: f64,
    /// Extra per-step delay in milliseconds when real-time mode is off.
    pub step_delay_ms: i64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            generations: 25,
            seed: 42,
            realtime: false,
            time_step_size: 0.01,
            step_delay_ms: 0,
        }
    }
}

/// Population shape and selection pressure.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PopulationSettings {
    pub size: usize,
    pub preserved_parents: usize,
    pub tournament_size: usize,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            size: 20,
            preserved_parents: 1,
            tournament_size: 3,
        }
    }
}

/// Variation parameters for the demo weight genome.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionSettings {
    pub genome_length: usize,
    pub mutation_rate: f64,
    pub mutation_strength: f64,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        Self {
            genome_length: 12,
            mutation_rate: 0.15,
            mutation_strength: 0.1,
        }
    }
}

/// Try/step bounds for the evaluation loop.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ExecutionSettings {
    pub tries: i64,
    pub steps: i64,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self { tries: 1, steps: 50 }
    }
}

/// The complete run configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RunConfig {
    pub run: RunSettings,
    pub population: PopulationSettings,
    pub evolution: EvolutionSettings,
    pub execution: ExecutionSettings,
}

impl RunConfig {
    /// Loads the configuration from `path`, falling back to the defaults
    /// when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
