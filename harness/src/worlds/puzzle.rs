//! `SlidingPuzzle`: the 3x3 eight-puzzle.
//!
//! Tiles are `1..=8`, the blank is `0`, the goal is `1 2 3 / 4 5 6 / 7 8 _`.
//! Operators name the direction the blank moves. Every move costs 1.

use std::fmt;

use meridian_kernel::model::{Heuristic, Operator, Problem, Successor};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::Direction;
use crate::contract::{World, WorldError};

const SIDE: usize = 3;
const CELLS: usize = SIDE * SIDE;

/// Row-major tile layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board(pub [u8; CELLS]);

impl Board {
    pub const GOAL: Board = Board([1, 2, 3, 4, 5, 6, 7, 8, 0]);

    fn blank(&self) -> usize {
        self.0.iter().position(|&t| t == 0).unwrap_or(CELLS - 1)
    }

    /// Position of the blank after moving it, if the move stays on the board.
    fn blank_target(&self, dir: Direction) -> Option<usize> {
        let b = self.blank();
        dir.step((b / SIDE, b % SIDE), SIDE, SIDE)
            .map(|(r, c)| r * SIDE + c)
    }

    /// Inversion parity check; only even permutations reach the goal.
    #[must_use]
    pub fn is_solvable(&self) -> bool {
        let tiles: Vec<u8> = self.0.iter().copied().filter(|&t| t != 0).collect();
        let inversions = tiles
            .iter()
            .enumerate()
            .map(|(i, a)| tiles[i + 1..].iter().filter(|b| *b < a).count())
            .sum::<usize>();
        inversions % 2 == 0
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(if i % SIDE == 0 { "/" } else { " " })?;
            }
            if *t == 0 {
                f.write_str("_")?;
            } else {
                write!(f, "{t}")?;
            }
        }
        Ok(())
    }
}

/// Move the blank one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide(pub Direction);

impl fmt::Display for Slide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Operator<Board> for Slide {
    fn cost(&self) -> u32 {
        1
    }

    fn order_index(&self) -> usize {
        self.0.index()
    }

    fn apply(&self, state: &Board) -> Board {
        let mut next = *state;
        if let Some(target) = state.blank_target(self.0) {
            next.0.swap(state.blank(), target);
        }
        next
    }
}

/// Sum of tile distances to their goal cells. Admissible and consistent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Heuristic<Board> for Manhattan {
    fn value(&self, state: &Board) -> f64 {
        let total: usize = state
            .0
            .iter()
            .enumerate()
            .filter(|(_, t)| **t != 0)
            .map(|(i, &t)| {
                let goal = usize::from(t) - 1;
                (i / SIDE).abs_diff(goal / SIDE) + (i % SIDE).abs_diff(goal % SIDE)
            })
            .sum();
        f64::from(u32::try_from(total).unwrap_or(u32::MAX))
    }

    fn name(&self) -> &str {
        "manhattan"
    }
}

/// Count of tiles off their goal cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct MisplacedTiles;

impl Heuristic<Board> for MisplacedTiles {
    fn value(&self, state: &Board) -> f64 {
        let misplaced = state
            .0
            .iter()
            .zip(Board::GOAL.0.iter())
            .filter(|(t, g)| **t != 0 && t != g)
            .count();
        f64::from(u32::try_from(misplaced).unwrap_or(u32::MAX))
    }

    fn name(&self) -> &str {
        "misplaced_tiles"
    }
}

/// An eight-puzzle instance.
#[derive(Debug, Clone)]
pub struct SlidingPuzzle {
    id: String,
    start: Board,
}

impl SlidingPuzzle {
    /// # Errors
    ///
    /// Returns [`WorldError::Malformed`] unless `tiles` is a permutation of
    /// `0..=8`. Unsolvable layouts are accepted; search reports them.
    pub fn new(id: impl Into<String>, tiles: [u8; CELLS]) -> Result<Self, WorldError> {
        let mut seen = [false; CELLS];
        for &t in &tiles {
            let slot = seen
                .get_mut(usize::from(t))
                .ok_or_else(|| WorldError::malformed(format!("tile {t} out of range")))?;
            if *slot {
                return Err(WorldError::malformed(format!("tile {t} appears twice")));
            }
            *slot = true;
        }
        Ok(Self {
            id: id.into(),
            start: Board(tiles),
        })
    }

    /// A solvable instance reached by `moves` random blank moves from the
    /// goal, never undoing the previous move.
    #[must_use]
    pub fn scrambled(moves: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut board = Board::GOAL;
        let mut last: Option<Direction> = None;
        for _ in 0..moves {
            let options: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|d| board.blank_target(*d).is_some())
                .filter(|d| !last.is_some_and(|l| undoes(l, *d)))
                .collect();
            let Some(&dir) = options.choose(&mut rng) else {
                break;
            };
            board = Slide(dir).apply(&board);
            last = Some(dir);
        }
        Self {
            id: format!("puzzle_scrambled_{moves}_{seed}"),
            start: board,
        }
    }

    #[must_use]
    pub fn start(&self) -> Board {
        self.start
    }
}

fn undoes(prev: Direction, next: Direction) -> bool {
    matches!(
        (prev, next),
        (Direction::Up, Direction::Down)
            | (Direction::Down, Direction::Up)
            | (Direction::Left, Direction::Right)
            | (Direction::Right, Direction::Left)
    )
}

impl Problem for SlidingPuzzle {
    type State = Board;
    type Op = Slide;

    fn initial_state(&self) -> Board {
        self.start
    }

    fn is_goal(&self, state: &Board) -> bool {
        *state == Board::GOAL
    }

    fn all_successors<'s>(&self, state: &'s Board) -> Vec<Successor<'s, Board, Slide>> {
        Direction::ALL
            .into_iter()
            .filter(|d| state.blank_target(*d).is_some())
            .map(|d| Successor::new(Slide(d), state))
            .collect()
    }

    fn all_predecessors(&self, state: &Board) -> Vec<(Slide, Board)> {
        // Moves are reversible: the predecessor via `d` is one blank move
        // away in the opposite direction.
        Direction::ALL
            .into_iter()
            .filter(|d| state.blank_target(*d).is_some())
            .map(|d| {
                let prev = Slide(d).apply(state);
                let back = Direction::ALL
                    .into_iter()
                    .find(|b| undoes(d, *b))
                    .unwrap_or(d);
                (Slide(back), prev)
            })
            .collect()
    }
}

impl World for SlidingPuzzle {
    fn world_id(&self) -> &str {
        &self.id
    }

    fn heuristics(&self) -> Vec<Box<dyn Heuristic<Board>>> {
        vec![Box::new(Manhattan), Box::new(MisplacedTiles)]
    }
}
