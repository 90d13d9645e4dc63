#![deny(unused_variables)]
#![deny(unused_imports)]

//! Hazard-weighted shortest-path planner used by FF-Replan.
//!
//! Plans ignore slip probabilities: every edge into a cell costs `C(cell)`,
//! so hazards are avoided unless no cheaper route exists.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use log::{debug, trace};

use crate::error::{MazeError, Result};
use crate::grid_world::{GridWorld, State};

/// Priority queue entry for Dijkstra's algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Frontier {
    cost: u64,
    state: State,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; equal costs pop the smaller coordinate first
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.state.cmp(&self.state))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Stateless Dijkstra planner over the grid's step costs.
#[derive(Clone, Copy, Debug)]
pub struct ShortestPathPlanner<'a> {
    grid: &'a GridWorld,
}

impl<'a> ShortestPathPlanner<'a> {
    pub fn new(grid: &'a GridWorld) -> Self {
        return ShortestPathPlanner { grid };
    }

    /// Computes a minimum-cost path from `start` to the nearest goal.
    ///
    /// # Returns
    ///
    /// The states after `start` up to and including the goal (empty when
    /// `start` is already a goal), `Unreachable` when no goal can be
    /// reached, or `OutOfBounds` when `start` is off the grid or a wall.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_stochastic_maze::grid_world::{GridWorld, State};
    /// use rust_stochastic_maze::shortest_path::ShortestPathPlanner;
    ///
    /// let grid: GridWorld = "3 6\n######\n#S  E#\n######\n".parse().unwrap();
    /// let plan = ShortestPathPlanner::new(&grid).plan(&State::new(1, 1)).unwrap();
    /// assert_eq!(plan, vec![State::new(1, 2), State::new(1, 3), State::new(1, 4)]);
    /// ```
    pub fn plan(&self, start: &State) -> Result<Vec<State>> {
        if !self.grid.is_valid_move(start) {
            return Err(MazeError::OutOfBounds {
                row: start.row,
                col: start.col,
            });
        }

        let mut dist: HashMap<State, u64> = HashMap::new();
        let mut parent: HashMap<State, State> = HashMap::new();
        let mut heap = BinaryHeap::new();

        dist.insert(*start, 0);
        heap.push(Frontier {
            cost: 0,
            state: *start,
        });

        let mut expanded = 0usize;
        while let Some(Frontier { cost, state }) = heap.pop() {
            // Stale entry superseded by a cheaper push
            if cost > dist.get(&state).copied().unwrap_or(u64::MAX) {
                continue;
            }

            if self.grid.is_terminal(&state) {
                let path = reconstruct(&parent, start, state);
                debug!(
                    "[Dijkstra] {} -> {}: cost={} steps={} expanded={}",
                    start,
                    state,
                    cost,
                    path.len(),
                    expanded
                );
                return Ok(path);
            }

            expanded += 1;
            for next in self.grid.neighbors(&state) {
                let new_dist = cost + self.grid.cost(&next) as u64;
                if new_dist < dist.get(&next).copied().unwrap_or(u64::MAX) {
                    dist.insert(next, new_dist);
                    parent.insert(next, state);
                    heap.push(Frontier {
                        cost: new_dist,
                        state: next,
                    });
                }
            }
        }

        trace!("[Dijkstra] {}: queue exhausted after {} expansions", start, expanded);
        return Err(MazeError::Unreachable { from: *start });
    }
}

/// Follows parent pointers from `goal` back to `start`, returning the path in
/// start-to-goal order without `start`.
fn reconstruct(parent: &HashMap<State, State>, start: &State, goal: State) -> Vec<State> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != *start {
        path.push(current);
        match parent.get(&current) {
            Some(p) => current = *p,
            None => break,
        }
    }
    path.reverse();
    return path;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(text: &str, start: State) -> Result<Vec<State>> {
        let grid: GridWorld = text.parse().unwrap();
        return ShortestPathPlanner::new(&grid).plan(&start);
    }

    #[test]
    fn test_corridor_plan_is_manhattan() {
        let path = plan("3 6\n######\n#S  E#\n######\n", State::new(1, 1)).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(&State::new(1, 4)));
    }

    #[test]
    fn test_open_room_plan_is_manhattan() {
        let text = "6 6\n######\n#S   #\n#    #\n#    #\n#   E#\n######\n";
        let path = plan(text, State::new(1, 1)).unwrap();
        assert_eq!(path.len(), 6);
        let mut previous = State::new(1, 1);
        for step in &path {
            assert!(previous.is_adjacent(step));
            previous = *step;
        }
    }

    #[test]
    fn test_plan_detours_around_hazard() {
        let text = "5 5\n#####\n# S #\n# D #\n# E #\n#####\n";
        let path = plan(text, State::new(1, 2)).unwrap();
        assert!(!path.contains(&State::new(2, 2)));
        // Equal-cost detours: the left one is found first.
        assert_eq!(
            path,
            vec![
                State::new(1, 1),
                State::new(2, 1),
                State::new(3, 1),
                State::new(3, 2),
            ]
        );
    }

    #[test]
    fn test_plan_through_unavoidable_hazard() {
        let path = plan("4 3\n###\n#S#\n#D#\n#E#\n", State::new(1, 1)).unwrap();
        assert_eq!(path, vec![State::new(2, 1), State::new(3, 1)]);
    }

    #[test]
    fn test_plan_prefers_long_detour_over_hazard() {
        // 49 floor steps still beat a single hazard of cost 50.
        let text = "5 7\n#######\n#S  D #\n# ### #\n#    E#\n#######\n";
        let path = plan(text, State::new(1, 1)).unwrap();
        assert!(!path.contains(&State::new(1, 4)));
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_plan_from_goal_is_empty() {
        let path = plan("1 2\nSE\n", State::new(0, 1)).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_unreachable_goal() {
        let err = plan("3 5\n#####\n#S#E#\n#####\n", State::new(1, 1)).unwrap_err();
        assert!(matches!(err, MazeError::Unreachable { from } if from == State::new(1, 1)));

        let err = plan("1 3\nS  \n", State::new(0, 0)).unwrap_err();
        assert!(matches!(err, MazeError::Unreachable { .. }));
    }

    #[test]
    fn test_start_off_grid_or_on_wall_is_rejected() {
        let text = "3 5\n#####\n#S E#\n#####\n";
        let err = plan(text, State::new(5, 5)).unwrap_err();
        assert!(matches!(err, MazeError::OutOfBounds { row: 5, col: 5 }));

        let err = plan(text, State::new(0, 0)).unwrap_err();
        assert!(matches!(err, MazeError::OutOfBounds { row: 0, col: 0 }));
    }
}
