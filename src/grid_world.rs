#![deny(unused_variables)]
#![deny(unused_imports)]

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{MazeError, Result};

// ============================================================================
// Cells and States
// ============================================================================

/// Kind of a single maze cell, decoded from its file symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Wall,
    Empty,
    Start,
    Hazard,
    Goal,
}

impl CellKind {
    pub fn from_symbol(symbol: char) -> Option<CellKind> {
        match symbol {
            '#' => return Some(CellKind::Wall),
            ' ' => return Some(CellKind::Empty),
            'S' => return Some(CellKind::Start),
            'D' => return Some(CellKind::Hazard),
            'E' => return Some(CellKind::Goal),
            _ => return None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            CellKind::Wall => return '#',
            CellKind::Empty => return ' ',
            CellKind::Start => return 'S',
            CellKind::Hazard => return 'D',
            CellKind::Goal => return 'E',
        }
    }

    /// Reward for entering a cell of this kind. Walls are never entered.
    pub fn reward(&self) -> f64 {
        match self {
            CellKind::Empty | CellKind::Start => return -1.0,
            CellKind::Hazard => return -50.0,
            CellKind::Goal => return 200.0,
            CellKind::Wall => return 0.0,
        }
    }

    /// Edge weight used by the shortest-path planner for entering this cell.
    pub fn cost(&self) -> u32 {
        match self {
            CellKind::Empty | CellKind::Start => return 1,
            CellKind::Hazard => return 50,
            CellKind::Goal => return 0,
            CellKind::Wall => return 0,
        }
    }
}

/// A `(row, col)` coordinate. Equality, hashing and ordering are structural
/// on the pair, ordering being row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State {
    pub row: usize,
    pub col: usize,
}

impl State {
    pub fn new(row: usize, col: usize) -> Self {
        return State { row, col };
    }

    /// Shifts the coordinate, returning `None` when it would go negative.
    pub fn offset(&self, dr: isize, dc: isize) -> Option<State> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        return Some(State { row, col });
    }

    /// True when `other` is one of the four orthogonal neighbours.
    pub fn is_adjacent(&self, other: &State) -> bool {
        return self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1;
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Orthogonal move directions, listed in neighbour enumeration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Right,
    Down,
}

impl Direction {
    /// Enumeration order of `GridWorld::neighbors`. Both planners break ties
    /// by this order.
    pub const ORDER: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Right,
        Direction::Down,
    ];

    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => return (-1, 0),
            Direction::Left => return (0, -1),
            Direction::Right => return (0, 1),
            Direction::Down => return (1, 0),
        }
    }
}

// ============================================================================
// GridWorld Environment
// ============================================================================

/// Immutable maze grid. Shared read-only by the stepper, both planners and
/// the executor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridWorld {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<CellKind>,
}

impl GridWorld {
    /// Builds a grid from rows of cells. Every row must have the same width.
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MazeError::Parse {
                    line: i + 1,
                    reason: format!("expected {} cells, found {}", cols, row.len()),
                });
            }
            cells.extend_from_slice(row);
        }
        return Ok(GridWorld {
            rows: rows.len(),
            cols,
            cells,
        });
    }

    /// Reads and parses a maze file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        return text.parse();
    }

    pub fn in_bounds(&self, state: &State) -> bool {
        return state.row < self.rows && state.col < self.cols;
    }

    pub fn cell_kind(&self, state: &State) -> Result<CellKind> {
        if !self.in_bounds(state) {
            return Err(MazeError::OutOfBounds {
                row: state.row,
                col: state.col,
            });
        }
        return Ok(self.cells[state.row * self.cols + state.col]);
    }

    /// Whether the agent may end up in `to`: in bounds and not a wall.
    /// Out-of-range targets are an invalid move, never an error.
    pub fn is_valid_move(&self, to: &State) -> bool {
        return matches!(self.cell_kind(to), Ok(kind) if kind != CellKind::Wall);
    }

    pub fn is_terminal(&self, state: &State) -> bool {
        return matches!(self.cell_kind(state), Ok(CellKind::Goal));
    }

    /// Valid orthogonal neighbours in up, left, right, down order.
    pub fn neighbors(&self, state: &State) -> Vec<State> {
        let mut result = Vec::with_capacity(4);
        for direction in Direction::ORDER {
            let (dr, dc) = direction.delta();
            if let Some(next) = state.offset(dr, dc) {
                if self.is_valid_move(&next) {
                    result.push(next);
                }
            }
        }
        return result;
    }

    /// `R(state)`, determined by the kind of the destination cell.
    pub fn reward(&self, state: &State) -> f64 {
        return self.cell_kind(state).map(|k| k.reward()).unwrap_or(0.0);
    }

    /// `C(state)`, the planning cost of entering the cell.
    pub fn cost(&self, state: &State) -> u32 {
        return self.cell_kind(state).map(|k| k.cost()).unwrap_or(0);
    }

    /// First `S` cell in row-major order.
    pub fn start(&self) -> Option<State> {
        return self
            .cells
            .iter()
            .position(|&k| k == CellKind::Start)
            .map(|i| State::new(i / self.cols, i % self.cols));
    }

    /// Planning universe: non-wall cells with at least one legal move, in
    /// row-major order.
    pub fn states(&self) -> Vec<State> {
        let mut states = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let state = State::new(row, col);
                if self.is_valid_move(&state) && !self.neighbors(&state).is_empty() {
                    states.push(state);
                }
            }
        }
        return states;
    }
}

impl FromStr for GridWorld {
    type Err = MazeError;

    /// Parses `"<n> <m>"` followed by `n` rows of exactly `m` symbols.
    fn from_str(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let header = lines.next().ok_or_else(|| MazeError::Parse {
            line: 1,
            reason: "missing header".to_string(),
        })?;

        let dims: Vec<usize> = header
            .split_whitespace()
            .map(|t| t.parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| MazeError::Parse {
                line: 1,
                reason: format!("bad dimensions: {}", e),
            })?;
        let (n, m) = match dims.as_slice() {
            [n, m] if *n > 0 && *m > 0 => (*n, *m),
            _ => {
                return Err(MazeError::Parse {
                    line: 1,
                    reason: format!("expected two positive integers, found {:?}", header),
                });
            }
        };

        let mut rows = Vec::with_capacity(n);
        for i in 0..n {
            let line_no = i + 2;
            let line = lines.next().ok_or_else(|| MazeError::Parse {
                line: line_no,
                reason: format!("expected {} rows, found {}", n, i),
            })?;
            let line = line.strip_suffix('\r').unwrap_or(line);

            let mut row = Vec::with_capacity(m);
            for symbol in line.chars() {
                let kind = CellKind::from_symbol(symbol).ok_or_else(|| MazeError::Parse {
                    line: line_no,
                    reason: format!("unknown cell symbol {:?}", symbol),
                })?;
                row.push(kind);
            }
            if row.len() != m {
                return Err(MazeError::Parse {
                    line: line_no,
                    reason: format!("expected {} cells, found {}", m, row.len()),
                });
            }
            rows.push(row);
        }

        return GridWorld::from_rows(rows);
    }
}
