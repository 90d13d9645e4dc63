#![deny(unused_variables)]
#![deny(unused_imports)]

//! Error types for the maze planners

use thiserror::Error;

use crate::grid_world::State;

/// Errors surfaced by the grid model, the planners and the executor.
#[derive(Error, Debug)]
pub enum MazeError {
    #[error("cell ({row}, {col}) lies outside the grid or inside a wall")]
    OutOfBounds { row: usize, col: usize },

    #[error("intended target {to} is not a 4-neighbour of {from}")]
    InvalidAction { from: State, to: State },

    #[error("no goal cell is reachable from {from}")]
    Unreachable { from: State },

    #[error("value iteration stopped after {iterations} sweeps with delta {delta:e}")]
    NonConvergence { iterations: usize, delta: f64 },

    #[error("trial exceeded the step ceiling of {steps}")]
    StepLimit { steps: usize },

    #[error("state {state} has no policy entry")]
    MissingPolicy { state: State },

    #[error("grid has no start cell")]
    MissingStart,

    #[error("grid parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for MazeError {
    fn from(e: toml::de::Error) -> Self {
        return MazeError::Config(e.to_string());
    }
}

pub type Result<T> = std::result::Result<T, MazeError>;
