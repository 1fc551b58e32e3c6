//! World implementations for the harness runner.

pub mod graph;
pub mod maze;
pub mod puzzle;

use std::fmt;

/// A move on a rectangular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Enumeration order of successors.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Stable order index.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }

    /// Neighbour of `(row, col)` in a `rows x cols` grid, if inside.
    #[must_use]
    pub fn step(
        self,
        (row, col): (usize, usize),
        rows: usize,
        cols: usize,
    ) -> Option<(usize, usize)> {
        let next = match self {
            Self::Up => (row.checked_sub(1)?, col),
            Self::Down => (row + 1, col),
            Self::Left => (row, col.checked_sub(1)?),
            Self::Right => (row, col + 1),
        };
        (next.0 < rows && next.1 < cols).then_some(next)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
