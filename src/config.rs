#![deny(unused_variables)]
#![deny(unused_imports)]

//! Configuration loading for the maze planners

use std::path::Path;

use serde::Deserialize;

use crate::error::{MazeError, Result};
use crate::grid_world::State;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PlannerConfig {
    #[serde(default)]
    pub solver: SolverConfig,

    #[serde(default)]
    pub trials: TrialConfig,

    /// Start cell as `[row, col]`; the grid's `S` cell when absent
    #[serde(default)]
    pub start: Option<(usize, usize)>,
}

/// Value iteration hyperparameters
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SolverConfig {
    /// Discount factor (default: 0.99999)
    #[serde(default = "default_discount")]
    pub discount: f64,

    /// Convergence threshold on the per-sweep delta (default: 1e-8)
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Sweep cap (default: 2000)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

/// Trial execution settings
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TrialConfig {
    /// Number of trials to run (default: 1)
    #[serde(default = "default_count")]
    pub count: usize,

    /// Base seed; trial `i` is seeded with `seed + i` (default: 42)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Step ceiling per trial (default: 10000)
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_discount() -> f64 {
    return 0.99999;
}

fn default_epsilon() -> f64 {
    return 1e-8;
}

fn default_max_iterations() -> usize {
    return 2000;
}

fn default_count() -> usize {
    return 1;
}

fn default_seed() -> u64 {
    return 42;
}

fn default_max_steps() -> usize {
    return 10_000;
}

impl Default for SolverConfig {
    fn default() -> Self {
        return SolverConfig {
            discount: default_discount(),
            epsilon: default_epsilon(),
            max_iterations: default_max_iterations(),
        };
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        return TrialConfig {
            count: default_count(),
            seed: default_seed(),
            max_steps: default_max_steps(),
        };
    }
}

impl PlannerConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PlannerConfig = toml::from_str(&content)?;
        config.validate()?;
        return Ok(config);
    }

    pub fn validate(&self) -> Result<()> {
        let discount = self.solver.discount;
        if !(discount > 0.0 && discount <= 1.0) {
            return Err(MazeError::Config(format!(
                "discount must be in (0, 1], got {}",
                discount
            )));
        }
        if !(self.solver.epsilon >= 0.0) {
            return Err(MazeError::Config(format!(
                "epsilon must be non-negative, got {}",
                self.solver.epsilon
            )));
        }
        if self.trials.max_steps == 0 {
            return Err(MazeError::Config("max_steps must be positive".to_string()));
        }
        return Ok(());
    }

    pub fn start_state(&self) -> Option<State> {
        return self.start.map(|(row, col)| State::new(row, col));
    }
}
