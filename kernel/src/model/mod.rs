//! Planning model contract.
//!
//! The search core never inspects a state. It only needs equality, hashing
//! and a deep copy, plus the ability to enumerate successors, test goals and
//! ask a heuristic for an estimate. Everything in this module is implemented
//! by the problem/heuristic subsystems, not by the search crate.

pub mod heuristic;
pub mod problem;

pub use heuristic::{FnHeuristic, Heuristic, HeuristicStats, ZeroHeuristic};
pub use problem::{Operator, Problem, State, Successor};
