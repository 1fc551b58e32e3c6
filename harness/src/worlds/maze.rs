//! `GridMaze`: a 4-connected grid parsed from ASCII.
//!
//! ```text
//! S..#
//! .#..
//! ...G
//! ```
//!
//! `S` start (exactly one), `G` goal (at least one), `#` wall, `.` floor.
//! Every step costs 1.

use std::fmt;

use meridian_kernel::model::{Heuristic, Operator, Problem, Successor};

use super::Direction;
use crate::contract::{World, WorldError};

/// `(row, col)` of the agent.
pub type Cell = (usize, usize);

/// One step of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    dir: Direction,
    rows: usize,
    cols: usize,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.dir, f)
    }
}

impl Operator<Cell> for Step {
    fn cost(&self) -> u32 {
        1
    }

    fn order_index(&self) -> usize {
        self.dir.index()
    }

    fn apply(&self, state: &Cell) -> Cell {
        self.dir.step(*state, self.rows, self.cols).unwrap_or(*state)
    }
}

/// Manhattan distance to the nearest goal.
#[derive(Debug, Clone)]
pub struct NearestGoal {
    goals: Vec<Cell>,
}

impl Heuristic<Cell> for NearestGoal {
    fn value(&self, state: &Cell) -> f64 {
        self.goals
            .iter()
            .map(|g| state.0.abs_diff(g.0) + state.1.abs_diff(g.1))
            .min()
            .map_or(f64::INFINITY, |d| {
                f64::from(u32::try_from(d).unwrap_or(u32::MAX))
            })
    }

    fn name(&self) -> &str {
        "nearest_goal"
    }
}

/// A parsed maze.
#[derive(Debug, Clone)]
pub struct GridMaze {
    id: String,
    rows: usize,
    cols: usize,
    walls: Vec<bool>,
    start: Cell,
    goals: Vec<Cell>,
}

impl GridMaze {
    /// Parse the ASCII layout. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Malformed`] for ragged rows, unknown characters,
    /// a missing or repeated start, or no goal.
    pub fn parse(id: impl Into<String>, text: &str) -> Result<Self, WorldError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.chars().count());
        if rows == 0 || cols == 0 {
            return Err(WorldError::malformed("empty maze"));
        }

        let mut walls = Vec::with_capacity(rows * cols);
        let mut start = None;
        let mut goals = Vec::new();
        for (r, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(WorldError::malformed(format!(
                    "row {r} has {} cells, expected {cols}",
                    line.chars().count()
                )));
            }
            for (c, ch) in line.chars().enumerate() {
                match ch {
                    '#' => walls.push(true),
                    '.' => walls.push(false),
                    'S' => {
                        if start.replace((r, c)).is_some() {
                            return Err(WorldError::malformed("more than one start"));
                        }
                        walls.push(false);
                    }
                    'G' => {
                        goals.push((r, c));
                        walls.push(false);
                    }
                    other => {
                        return Err(WorldError::malformed(format!(
                            "unknown cell `{other}` at ({r}, {c})"
                        )))
                    }
                }
            }
        }
        let start = start.ok_or_else(|| WorldError::malformed("no start cell"))?;
        if goals.is_empty() {
            return Err(WorldError::malformed("no goal cell"));
        }
        Ok(Self {
            id: id.into(),
            rows,
            cols,
            walls,
            start,
            goals,
        })
    }

    /// An open `side x side` room, start top-left, goal bottom-right.
    #[must_use]
    pub fn open_room(side: usize) -> Self {
        let side = side.max(2);
        Self {
            id: format!("open_room_{side}"),
            rows: side,
            cols: side,
            walls: vec![false; side * side],
            start: (0, 0),
            goals: vec![(side - 1, side - 1)],
        }
    }

    fn is_wall(&self, (r, c): Cell) -> bool {
        self.walls[r * self.cols + c]
    }

    #[must_use]
    pub fn nearest_goal(&self) -> NearestGoal {
        NearestGoal {
            goals: self.goals.clone(),
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl Problem for GridMaze {
    type State = Cell;
    type Op = Step;

    fn initial_state(&self) -> Cell {
        self.start
    }

    fn is_goal(&self, state: &Cell) -> bool {
        self.goals.contains(state)
    }

    fn all_successors<'s>(&self, state: &'s Cell) -> Vec<Successor<'s, Cell, Step>> {
        Direction::ALL
            .into_iter()
            .filter(|d| {
                d.step(*state, self.rows, self.cols)
                    .is_some_and(|next| !self.is_wall(next))
            })
            .map(|dir| {
                let op = Step {
                    dir,
                    rows: self.rows,
                    cols: self.cols,
                };
                Successor::new(op, state)
            })
            .collect()
    }

    fn all_predecessors(&self, state: &Cell) -> Vec<(Step, Cell)> {
        // Moves are symmetric on open cells.
        self.all_successors(state)
            .into_iter()
            .map(|s| {
                let prev = s.state();
                let back = Direction::ALL
                    .into_iter()
                    .find(|d| d.step(prev, self.rows, self.cols) == Some(*state))
                    .unwrap_or(s.operator.dir);
                let op = Step {
                    dir: back,
                    ..s.operator
                };
                (op, prev)
            })
            .collect()
    }
}

impl World for GridMaze {
    fn world_id(&self) -> &str {
        &self.id
    }

    fn heuristics(&self) -> Vec<Box<dyn Heuristic<Cell>>> {
        vec![Box::new(self.nearest_goal())]
    }
}
