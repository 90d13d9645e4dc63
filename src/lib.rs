//! Planning in a stochastic grid maze.
//!
//! Moves succeed with probability 0.7 and slip to either side with
//! probability 0.15. Two strategies are provided:
//!
//! - **FF-Replan** ([`shortest_path`]): follow a hazard-weighted shortest
//!   path and replan whenever a step lands somewhere else.
//! - **Value iteration** ([`value_iteration`]): solve the discounted MDP for
//!   a greedy policy and follow it by table lookup.
//!
//! [`executor`] runs single trials or seeded parallel batches of either.

pub mod config;
pub mod error;
pub mod executor;
pub mod grid_world;
pub mod render;
pub mod shortest_path;
pub mod statistics;
pub mod stepper;
pub mod value_iteration;

pub use error::{MazeError, Result};
