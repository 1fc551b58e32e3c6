//! Meridian Search: heuristic search engines over the kernel planning model.
//!
//! This crate depends only on `meridian_kernel`. It does NOT depend on
//! `meridian_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! meridian_kernel  ←  meridian_search  ←  meridian_harness
//! (model, proof)      (engines)            (worlds, runner, reports)
//! ```
//!
//! # Key types
//!
//! - [`frontier::Frontier`] -- keyed min-priority open list, four implementations
//! - [`node::NodeStore`] -- per-state best cost, closed flag and predecessor
//! - [`plan::SolutionPlan`] -- the operator sequence an engine returns
//! - [`astar`] -- A*, multi-heuristic A*, f-bounded A*, IDA*, greedy best-first
//! - [`beam::BeamStackSearch`] -- width-bounded best-first search
//! - [`mcts::MctsSolver`] -- Monte-Carlo tree search with rollout policies
//! - [`planner::Planner`] -- the common engine interface
//! - [`outcome::SearchOutcome`] -- status, plan, counters and optional trace

#![forbid(unsafe_code)]

pub mod astar;
pub mod beam;
pub mod budget;
pub mod config;
pub mod error;
pub mod frontier;
pub mod mcts;
pub mod node;
pub mod outcome;
pub mod plan;
pub mod planner;
pub mod trace;

pub use astar::{AStar, BoundedAStar, GreedyBestFirst, IdaStar, MultiHeuristicAStar};
pub use beam::BeamStackSearch;
pub use config::{MctsConfig, SearchConfig};
pub use error::SearchError;
pub use frontier::{Frontier, FrontierKind, PriorityKey};
pub use mcts::MctsSolver;
pub use outcome::{SearchOutcome, SearchStats, SearchStatus};
pub use plan::SolutionPlan;
pub use planner::Planner;
