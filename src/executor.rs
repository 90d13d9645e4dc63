#![deny(unused_variables)]
#![deny(unused_imports)]

//! Trial execution for both planning strategies.

use std::collections::VecDeque;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::{MazeError, Result};
use crate::grid_world::{GridWorld, State};
use crate::shortest_path::ShortestPathPlanner;
use crate::statistics::TrialBatch;
use crate::stepper::StochasticStepper;
use crate::value_iteration::Policy;

// ============================================================================
// Strategies and Outcomes
// ============================================================================

/// How the executor chooses the next intended move.
#[derive(Clone, Copy, Debug)]
pub enum Strategy<'a> {
    /// FF-Replan: follow a shortest path, replanning after any deviation.
    Replan(ShortestPathPlanner<'a>),
    /// Follow a precomputed greedy policy.
    Policy(&'a Policy),
}

/// Result of one successful trial.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialOutcome {
    /// Sum of the rewards of every step taken.
    pub reward: f64,
    /// Visited states from the start to the final state, both included.
    pub path: Vec<State>,
    /// Number of steps taken.
    pub steps: usize,
    /// Number of plans computed after the initial one (always 0 in policy mode).
    pub replans: usize,
}

// ============================================================================
// Executor
// ============================================================================

/// Runs trials on a shared grid, giving up after `max_steps` steps.
#[derive(Clone, Copy, Debug)]
pub struct Executor<'a> {
    grid: &'a GridWorld,
    stepper: StochasticStepper<'a>,
    max_steps: usize,
}

impl<'a> Executor<'a> {
    pub fn new(grid: &'a GridWorld, max_steps: usize) -> Self {
        return Executor {
            grid,
            stepper: StochasticStepper::new(grid),
            max_steps,
        };
    }

    /// Runs one trial from `start` until a goal is reached.
    ///
    /// # Errors
    ///
    /// * `Unreachable` - replanning found no route to a goal
    /// * `MissingPolicy` - policy mode reached a state without a policy entry
    /// * `StepLimit` - no goal within `max_steps` steps
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    /// use rust_stochastic_maze::executor::{Executor, Strategy};
    /// use rust_stochastic_maze::grid_world::{GridWorld, State};
    /// use rust_stochastic_maze::shortest_path::ShortestPathPlanner;
    ///
    /// let grid: GridWorld = "3 5\n#####\n#S E#\n#####\n".parse().unwrap();
    /// let executor = Executor::new(&grid, 1000);
    /// let strategy = Strategy::Replan(ShortestPathPlanner::new(&grid));
    /// let mut rng = StdRng::seed_from_u64(1);
    ///
    /// let outcome = executor.run_trial(&strategy, &State::new(1, 1), &mut rng).unwrap();
    /// assert_eq!(outcome.path.first(), Some(&State::new(1, 1)));
    /// assert_eq!(outcome.path.last(), Some(&State::new(1, 3)));
    /// ```
    pub fn run_trial<R: Rng + ?Sized>(
        &self,
        strategy: &Strategy<'_>,
        start: &State,
        rng: &mut R,
    ) -> Result<TrialOutcome> {
        match strategy {
            Strategy::Replan(planner) => return self.run_replan(planner, start, rng),
            Strategy::Policy(policy) => return self.run_policy(policy, start, rng),
        }
    }

    /// Runs `count` independent trials in parallel. Trial `i` uses its own
    /// `StdRng` seeded with `seed + i`, so batches are reproducible.
    pub fn run_trials(
        &self,
        strategy: &Strategy<'_>,
        start: &State,
        count: usize,
        seed: u64,
    ) -> TrialBatch {
        let results: Vec<(usize, Result<TrialOutcome>)> = (0..count)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                (i, self.run_trial(strategy, start, &mut rng))
            })
            .collect();

        let mut batch = TrialBatch::default();
        for (i, result) in results {
            match result {
                Ok(outcome) => batch.outcomes.push(outcome),
                Err(e) => {
                    warn!("[Executor] trial {} failed: {}", i, e);
                    batch.failures.push((i, e));
                }
            }
        }
        return batch;
    }

    fn run_replan<R: Rng + ?Sized>(
        &self,
        planner: &ShortestPathPlanner<'_>,
        start: &State,
        rng: &mut R,
    ) -> Result<TrialOutcome> {
        let mut plan: VecDeque<State> = planner.plan(start)?.into();
        let mut state = *start;
        let mut path = vec![state];
        let mut reward = 0.0;
        let mut replans = 0;

        while !self.grid.is_terminal(&state) {
            if path.len() > self.max_steps {
                return Err(MazeError::StepLimit {
                    steps: self.max_steps,
                });
            }

            let target = plan
                .pop_front()
                .ok_or(MazeError::Unreachable { from: state })?;
            let (next, r) = self.stepper.step(&state, &target, rng)?;
            reward += r;
            state = next;
            path.push(state);

            // Any deviation invalidates the rest of the plan
            if state != target && !self.grid.is_terminal(&state) {
                debug!(
                    "[Executor] deviated to {} instead of {}, replanning",
                    state, target
                );
                plan = planner.plan(&state)?.into();
                replans += 1;
            }
        }

        return Ok(TrialOutcome {
            reward,
            steps: path.len() - 1,
            path,
            replans,
        });
    }

    fn run_policy<R: Rng + ?Sized>(
        &self,
        policy: &Policy,
        start: &State,
        rng: &mut R,
    ) -> Result<TrialOutcome> {
        let mut state = *start;
        let mut path = vec![state];
        let mut reward = 0.0;

        loop {
            let action = policy
                .get(&state)
                .ok_or(MazeError::MissingPolicy { state })?;
            let target = match action {
                Some(target) => *target,
                None => break,
            };

            if path.len() > self.max_steps {
                return Err(MazeError::StepLimit {
                    steps: self.max_steps,
                });
            }

            let (next, r) = self.stepper.step(&state, &target, rng)?;
            reward += r;
            state = next;
            path.push(state);
        }

        return Ok(TrialOutcome {
            reward,
            steps: path.len() - 1,
            path,
            replans: 0,
        });
    }
}
