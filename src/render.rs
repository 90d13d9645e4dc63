#![deny(unused_variables)]
#![deny(unused_imports)]

//! Text rendering of grids, trial paths and policies.

use std::collections::HashSet;

use crate::grid_world::{CellKind, GridWorld, State};
use crate::value_iteration::Policy;

/// Renders the grid with a trial path drawn over it.
///
/// # Symbols
///
/// - `*` : Visited floor cell
/// - `!` : Visited hazard
/// - `S`, `E`, `D`, `#` : Unvisited cells keep their file symbol; start
///   and goal are never overdrawn
///
/// # Examples
///
/// ```
/// use rust_stochastic_maze::grid_world::{GridWorld, State};
/// use rust_stochastic_maze::render::render_path;
///
/// let grid: GridWorld = "3 5\n#####\n#S E#\n#####\n".parse().unwrap();
/// let path = vec![State::new(1, 1), State::new(1, 2), State::new(1, 3)];
/// assert_eq!(render_path(&grid, &path), "#####\n#S*E#\n#####\n");
/// ```
pub fn render_path(grid: &GridWorld, path: &[State]) -> String {
    let visited: HashSet<State> = path.iter().copied().collect();
    let mut output = String::with_capacity(grid.rows * (grid.cols + 1));

    for r in 0..grid.rows {
        for c in 0..grid.cols {
            let state = State::new(r, c);
            let kind = grid.cell_kind(&state).unwrap_or(CellKind::Wall);
            let symbol = match kind {
                CellKind::Empty if visited.contains(&state) => '*',
                CellKind::Hazard if visited.contains(&state) => '!',
                _ => kind.symbol(),
            };
            output.push(symbol);
        }
        output.push('\n');
    }

    return output;
}

/// Renders a policy as one arrow per cell.
///
/// # Symbols
///
/// - `^ v < >` : Chosen move
/// - `E` : Goal
/// - `#` : Wall
/// - `?` : Open cell without a policy entry
pub fn render_policy(grid: &GridWorld, policy: &Policy) -> String {
    let mut output = String::with_capacity(grid.rows * (grid.cols + 1));

    for r in 0..grid.rows {
        for c in 0..grid.cols {
            let state = State::new(r, c);
            let symbol = match grid.cell_kind(&state) {
                Ok(CellKind::Wall) | Err(_) => '#',
                Ok(CellKind::Goal) => 'E',
                Ok(_) => match policy.get(&state).copied().flatten() {
                    Some(target) => arrow(&state, &target),
                    None => '?',
                },
            };
            output.push(symbol);
        }
        output.push('\n');
    }

    return output;
}

fn arrow(from: &State, to: &State) -> char {
    if to.row < from.row {
        return '^';
    } else if to.row > from.row {
        return 'v';
    } else if to.col < from.col {
        return '<';
    } else if to.col > from.col {
        return '>';
    } else {
        return '?';
    }
}
