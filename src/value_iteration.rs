#![deny(unused_variables)]
#![deny(unused_imports)]

//! Value iteration over the discounted maze MDP.
//!
//! Sweeps update the value table in place: a backup later in a sweep already
//! sees the values written earlier in the same sweep (Gauss-Seidel style).
//! This converges faster than synchronous value iteration and its numbers
//! differ from it, so the update order is part of the contract.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::error::{MazeError, Result};
use crate::grid_world::{GridWorld, State};
use crate::stepper::StochasticStepper;

// ============================================================================
// Policy and Solve Report
// ============================================================================

/// Greedy policy: the chosen target for each state, `None` on goals.
pub type Policy = HashMap<State, Option<State>>;

/// Outcome of one `solve` call.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveReport {
    /// Number of full sweeps performed.
    pub iterations: usize,
    /// Largest value change in the last sweep.
    pub delta: f64,
    /// Largest value change of every sweep, in order.
    pub deltas: Vec<f64>,
    /// Whether `delta <= epsilon` was reached before the iteration cap.
    pub converged: bool,
}

impl SolveReport {
    /// Turns an uncertified result into `NonConvergence`.
    pub fn ensure_converged(&self) -> Result<()> {
        if self.converged {
            return Ok(());
        } else {
            return Err(MazeError::NonConvergence {
                iterations: self.iterations,
                delta: self.delta,
            });
        }
    }
}

// ============================================================================
// Value Iteration Solver
// ============================================================================

pub struct ValueIterationSolver<'a> {
    grid: &'a GridWorld,
    stepper: StochasticStepper<'a>,
    /// Planning universe in row-major order.
    states: Vec<State>,
    values: HashMap<State, f64>,
    policy: Policy,
    /// `(state, intended target)` -> outcome distribution.
    outcome_cache: HashMap<(State, State), Vec<(State, f64)>>,
}

impl<'a> ValueIterationSolver<'a> {
    /// Creates a solver with all values at 0.
    ///
    /// The initial policy picks each state's first admissible move; goals
    /// map to `None`.
    pub fn new(grid: &'a GridWorld) -> Self {
        let states = grid.states();
        let mut values = HashMap::with_capacity(states.len());
        let mut policy = Policy::with_capacity(states.len());
        for state in &states {
            values.insert(*state, 0.0);
            let action = if grid.is_terminal(state) {
                None
            } else {
                grid.neighbors(state).first().copied()
            };
            policy.insert(*state, action);
        }

        return ValueIterationSolver {
            grid,
            stepper: StochasticStepper::new(grid),
            states,
            values,
            policy,
            outcome_cache: HashMap::new(),
        };
    }

    /// Runs in-place Bellman sweeps until the largest change in a sweep is
    /// at most `epsilon`, or `max_iterations` sweeps have been done.
    ///
    /// # Arguments
    ///
    /// * `discount` - Discount factor applied to successor values
    /// * `epsilon` - Convergence threshold on the per-sweep delta
    /// * `max_iterations` - Sweep cap
    ///
    /// # Returns
    ///
    /// A `SolveReport`; check `converged` (or call `ensure_converged`) to
    /// know which condition stopped the loop
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_stochastic_maze::grid_world::{GridWorld, State};
    /// use rust_stochastic_maze::value_iteration::ValueIterationSolver;
    ///
    /// let grid: GridWorld = "3 5\n#####\n#S E#\n#####\n".parse().unwrap();
    /// let mut solver = ValueIterationSolver::new(&grid);
    /// let report = solver.solve(0.99999, 1e-8, 2000).unwrap();
    ///
    /// assert!(report.converged);
    /// assert_eq!(solver.action(&State::new(1, 2)), Some(State::new(1, 3)));
    /// ```
    pub fn solve(
        &mut self,
        discount: f64,
        epsilon: f64,
        max_iterations: usize,
    ) -> Result<SolveReport> {
        let mut delta = f64::INFINITY;
        let mut deltas = Vec::new();
        let mut iterations = 0;

        while delta > epsilon && iterations < max_iterations {
            iterations += 1;
            delta = 0.0;

            for i in 0..self.states.len() {
                let state = self.states[i];
                if self.grid.is_terminal(&state) {
                    continue;
                }

                let mut best_value = f64::NEG_INFINITY;
                let mut best_action = None;
                for action in self.grid.neighbors(&state) {
                    let value = self.expected_value(&state, &action, discount)?;
                    // Strict comparison: the first action reaching the maximum wins
                    if value > best_value {
                        best_value = value;
                        best_action = Some(action);
                    }
                }

                let old_value = self.value(&state);
                delta = delta.max((old_value - best_value).abs());
                self.values.insert(state, best_value);
                self.policy.insert(state, best_action);
            }

            debug!("[ValueIteration] sweep {}: delta={:e}", iterations, delta);
            deltas.push(delta);
        }

        let converged = delta <= epsilon;
        if converged {
            info!(
                "[ValueIteration] converged after {} sweeps (delta={:e})",
                iterations, delta
            );
        } else {
            warn!(
                "[ValueIteration] stopped at the cap of {} sweeps (delta={:e} > {:e})",
                iterations, delta, epsilon
            );
        }

        return Ok(SolveReport {
            iterations,
            delta,
            deltas,
            converged,
        });
    }

    /// `Σ p · (R(o) + discount · V(o))` over the outcomes of `action`, using
    /// the current value table.
    fn expected_value(&mut self, state: &State, action: &State, discount: f64) -> Result<f64> {
        if !self.outcome_cache.contains_key(&(*state, *action)) {
            let outcomes = self.stepper.outcomes(state, action)?;
            self.outcome_cache.insert((*state, *action), outcomes);
        }

        let mut total = 0.0;
        if let Some(outcomes) = self.outcome_cache.get(&(*state, *action)) {
            for (next, probability) in outcomes {
                total += probability * (self.grid.reward(next) + discount * self.value(next));
            }
        }
        return Ok(total);
    }

    /// Current value estimate; states outside the universe read as 0.
    pub fn value(&self, state: &State) -> f64 {
        return self.values.get(state).copied().unwrap_or(0.0);
    }

    /// Greedy action for `state`, `None` for goals and unknown states.
    pub fn action(&self, state: &State) -> Option<State> {
        return self.policy.get(state).copied().flatten();
    }

    pub fn values(&self) -> &HashMap<State, f64> {
        return &self.values;
    }

    pub fn policy(&self) -> &Policy {
        return &self.policy;
    }

    pub fn states(&self) -> &[State] {
        return &self.states;
    }

    /// Cached outcome distribution for `(state, action)`, if already computed.
    pub fn cached_outcomes(&self, state: &State, action: &State) -> Option<&[(State, f64)]> {
        return self
            .outcome_cache
            .get(&(*state, *action))
            .map(|v| v.as_slice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    const DISCOUNT: f64 = 0.99999;
    const EPSILON: f64 = 1e-8;
    const MAX_ITERATIONS: usize = 2000;

    fn solved(text: &str) -> (GridWorld, SolveReport, Policy, HashMap<State, f64>) {
        let grid: GridWorld = text.parse().unwrap();
        let (report, policy, values) = {
            let mut solver = ValueIterationSolver::new(&grid);
            let report = solver.solve(DISCOUNT, EPSILON, MAX_ITERATIONS).unwrap();
            (report, solver.policy().clone(), solver.values().clone())
        };
        return (grid, report, policy, values);
    }

    #[test]
    fn test_initial_policy_and_values() {
        let grid: GridWorld = "3 5\n#####\n#S E#\n#####\n".parse().unwrap();
        let solver = ValueIterationSolver::new(&grid);
        assert_eq!(solver.states().len(), 3);
        assert!(solver.values().values().all(|v| *v == 0.0));
        assert_eq!(solver.action(&State::new(1, 1)), Some(State::new(1, 2)));
        assert_eq!(solver.policy().get(&State::new(1, 3)), Some(&None));
    }

    #[test]
    fn test_single_hazard_column() {
        let (_, report, policy, values) = solved("4 3\n###\n#S#\n#D#\n#E#\n");
        assert!(report.converged);
        assert_eq!(report.iterations, 24);
        assert_eq!(policy[&State::new(1, 1)], Some(State::new(2, 1)));
        assert_eq!(policy[&State::new(2, 1)], Some(State::new(3, 1)));
        assert_eq!(policy[&State::new(3, 1)], None);
        assert_abs_diff_eq!(values[&State::new(1, 1)], 128.1398, epsilon = 1e-3);
        assert_abs_diff_eq!(values[&State::new(2, 1)], 178.5707, epsilon = 1e-3);
        assert_eq!(values[&State::new(3, 1)], 0.0);
    }

    #[test]
    fn test_routes_around_hazard() {
        let (_, report, policy, values) = solved("5 5\n#####\n# S #\n# D #\n# E #\n#####\n");
        assert!(report.converged);
        assert_eq!(report.iterations, 29);

        // The detours are worth the same up to in-place update order; left is
        // checked first and keeps the move.
        assert_eq!(policy[&State::new(1, 2)], Some(State::new(1, 1)));
        assert_eq!(policy[&State::new(1, 3)], Some(State::new(2, 3)));
        assert_eq!(policy[&State::new(1, 1)], Some(State::new(2, 1)));
        assert_eq!(policy[&State::new(2, 1)], Some(State::new(3, 1)));
        assert_eq!(policy[&State::new(3, 1)], Some(State::new(3, 2)));
        assert_abs_diff_eq!(values[&State::new(1, 2)], 176.454, epsilon = 1e-3);
        assert_abs_diff_eq!(
            values[&State::new(1, 1)],
            values[&State::new(1, 3)],
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_exact_tie_keeps_first_action() {
        // Both goals give the identical backup 0.7 * 200 + 0.3 * (-1 + d * V).
        let (_, report, policy, _) = solved("5 3\n###\n#E#\n#S#\n#E#\n###\n");
        assert!(report.converged);
        assert_eq!(policy[&State::new(2, 1)], Some(State::new(1, 1)));

        let (_, _, policy, _) = solved("3 5\n#####\n#ESE#\n#####\n");
        assert_eq!(policy[&State::new(1, 2)], Some(State::new(1, 1)));

        let grid: GridWorld = "5 3\n###\n#E#\n#S#\n#E#\n###\n".parse().unwrap();
        let mut solver = ValueIterationSolver::new(&grid);
        solver.solve(DISCOUNT, EPSILON, 1).unwrap();
        assert_eq!(solver.action(&State::new(2, 1)), Some(State::new(1, 1)));
        assert_abs_diff_eq!(solver.value(&State::new(2, 1)), 139.7, epsilon = 1e-9);
    }

    #[test]
    fn test_long_detour_policy() {
        let (_, report, policy, _) =
            solved("5 7\n#######\n#S  D #\n# ### #\n#    E#\n#######\n");
        assert!(report.converged);
        assert_eq!(report.iterations, 44);
        assert_eq!(policy[&State::new(1, 1)], Some(State::new(2, 1)));
        assert_eq!(policy[&State::new(1, 3)], Some(State::new(1, 2)));
        assert_eq!(policy[&State::new(1, 5)], Some(State::new(2, 5)));
    }

    #[test]
    fn test_delta_history_non_increasing() {
        for text in [
            "4 3\n###\n#S#\n#D#\n#E#\n",
            "5 5\n#####\n# S #\n# D #\n# E #\n#####\n",
            "5 7\n#######\n#S  D #\n# ### #\n#    E#\n#######\n",
        ] {
            let (_, report, _, _) = solved(text);
            assert_eq!(report.deltas.len(), report.iterations);
            assert_eq!(report.deltas.last().copied(), Some(report.delta));
            for pair in report.deltas.windows(2) {
                assert!(pair[1] <= pair[0], "delta increased: {:?}", pair);
            }
        }
    }

    #[test]
    fn test_first_sweep_delta() {
        let (_, report, _, _) = solved("4 3\n###\n#S#\n#D#\n#E#\n");
        // Sweep 1: V(S) = 0.7 * -50 + 0.3 * -1, then V(D) = 0.7 * 200 + 0.3 * -50.
        assert_abs_diff_eq!(report.deltas[0], 125.0, epsilon = 1e-9);
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let grid: GridWorld = "5 5\n#####\n# S #\n# D #\n# E #\n#####\n".parse().unwrap();
        let mut solver = ValueIterationSolver::new(&grid);
        let report = solver.solve(DISCOUNT, EPSILON, 3).unwrap();
        assert_eq!(report.iterations, 3);
        assert!(!report.converged);
        assert!(matches!(
            report.ensure_converged(),
            Err(MazeError::NonConvergence { iterations: 3, .. })
        ));
    }

    #[test]
    fn test_zero_iterations_keeps_initial_table() {
        let grid: GridWorld = "3 5\n#####\n#S E#\n#####\n".parse().unwrap();
        let mut solver = ValueIterationSolver::new(&grid);
        let report = solver.solve(DISCOUNT, EPSILON, 0).unwrap();
        assert_eq!(report.iterations, 0);
        assert!(!report.converged);
        assert_eq!(solver.value(&State::new(1, 1)), 0.0);
    }

    #[test]
    fn test_outcome_cache_filled() {
        let grid: GridWorld = "4 3\n###\n#S#\n#D#\n#E#\n".parse().unwrap();
        let mut solver = ValueIterationSolver::new(&grid);
        solver.solve(DISCOUNT, EPSILON, 1).unwrap();
        let outcomes = solver
            .cached_outcomes(&State::new(1, 1), &State::new(2, 1))
            .unwrap();
        let total: f64 = outcomes.iter().map(|(_, p)| p).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
    }
}
