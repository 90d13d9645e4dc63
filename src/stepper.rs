#![deny(unused_variables)]
#![deny(unused_imports)]

//! Stochastic transition model shared by both planners.
//!
//! An attempted move reaches its target with probability 0.7 and slips to
//! either lateral neighbour with probability 0.15 each. A slip or move into a
//! wall or off the grid leaves the agent where it was.

use log::trace;
use rand::Rng;

use crate::error::{MazeError, Result};
use crate::grid_world::{GridWorld, State};

/// Probability that the intended move is carried out.
pub const SUCCESS_PROBABILITY: f64 = 0.7;

/// Probability of slipping to each of the two lateral neighbours.
pub const SLIP_PROBABILITY: f64 = 0.15;

/// Samples and enumerates outcomes of intended moves on a grid.
#[derive(Clone, Copy, Debug)]
pub struct StochasticStepper<'a> {
    grid: &'a GridWorld,
}

impl<'a> StochasticStepper<'a> {
    pub fn new(grid: &'a GridWorld) -> Self {
        return StochasticStepper { grid };
    }

    /// Samples the next state and its reward for an attempted move.
    ///
    /// # Arguments
    ///
    /// * `state` - The current state
    /// * `intended` - The 4-neighbour the agent tries to move into
    /// * `rng` - Random source; the only randomness in the crate
    ///
    /// # Returns
    ///
    /// `(next_state, R(next_state))`, or `InvalidAction` when `intended` is
    /// not adjacent to `state`
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    /// use rust_stochastic_maze::grid_world::{GridWorld, State};
    /// use rust_stochastic_maze::stepper::StochasticStepper;
    ///
    /// let grid: GridWorld = "3 3\n###\n#S#\n#E#\n".parse().unwrap();
    /// let stepper = StochasticStepper::new(&grid);
    /// let mut rng = StdRng::seed_from_u64(7);
    ///
    /// let (next, _reward) = stepper
    ///     .step(&State::new(1, 1), &State::new(2, 1), &mut rng)
    ///     .unwrap();
    /// assert!(next == State::new(1, 1) || next == State::new(2, 1));
    /// ```
    pub fn step<R: Rng + ?Sized>(
        &self,
        state: &State,
        intended: &State,
        rng: &mut R,
    ) -> Result<(State, f64)> {
        let (first, second) = self.laterals(state, intended)?;

        let chance: f64 = rng.gen();
        let candidate = if chance < SLIP_PROBABILITY {
            first
        } else if chance < 2.0 * SLIP_PROBABILITY {
            second
        } else {
            Some(*intended)
        };

        let next = self.resolve(state, candidate);
        trace!(
            "[Step] {} -> {} intended {} (draw {:.3})",
            state,
            next,
            intended,
            chance
        );
        return Ok((next, self.grid.reward(&next)));
    }

    /// Enumerates every outcome of an attempted move with its probability.
    ///
    /// Invalid candidates are redirected to `state`, and entries landing on
    /// the same state are merged, so a valid intended move yields 2 or 3
    /// entries summing to 1.0. The intended outcome always comes first.
    pub fn outcomes(&self, state: &State, intended: &State) -> Result<Vec<(State, f64)>> {
        let (first, second) = self.laterals(state, intended)?;

        let mut outcomes: Vec<(State, f64)> = Vec::with_capacity(3);
        let candidates = [
            (Some(*intended), SUCCESS_PROBABILITY),
            (first, SLIP_PROBABILITY),
            (second, SLIP_PROBABILITY),
        ];
        for (candidate, probability) in candidates {
            let next = self.resolve(state, candidate);
            match outcomes.iter_mut().find(|(s, _)| *s == next) {
                Some(entry) => entry.1 += probability,
                None => outcomes.push((next, probability)),
            }
        }
        return Ok(outcomes);
    }

    /// Lateral slip candidates `(first, second)`: east and west for a
    /// vertical move, south and north for a horizontal one. `None` marks a
    /// candidate with a negative coordinate.
    fn laterals(&self, state: &State, intended: &State) -> Result<(Option<State>, Option<State>)> {
        if !state.is_adjacent(intended) {
            return Err(MazeError::InvalidAction {
                from: *state,
                to: *intended,
            });
        }

        let vertical = intended.col == state.col;
        if vertical {
            return Ok((state.offset(0, 1), state.offset(0, -1)));
        } else {
            return Ok((state.offset(1, 0), state.offset(-1, 0)));
        }
    }

    fn resolve(&self, state: &State, candidate: Option<State>) -> State {
        match candidate {
            Some(next) if self.grid.is_valid_move(&next) => return next,
            _ => return *state,
        }
    }
}
