//! Harness runner: builds an engine, runs it over a world, replays the plan.
//!
//! # Pipeline
//!
//! ```text
//! config_digest() → build_planner() → solve()        [catch_unwind: solve]
//!   → SolutionPlan::replay()                          [catch_unwind: plan_replay]
//!   → RunReport
//! ```
//!
//! A panic in a collaborator (problem model or heuristic) never escapes the
//! runner: it becomes a `Canceled` report carrying the stage that panicked.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use meridian_kernel::model::{Heuristic, ZeroHeuristic};
use meridian_kernel::proof::canon::CanonError;
use meridian_search::trace::{PanicStage, TerminationReason};
use meridian_search::{
    AStar, BeamStackSearch, BoundedAStar, GreedyBestFirst, IdaStar, MctsSolver,
    MultiHeuristicAStar, Planner, SearchConfig, SearchError, SearchStats,
};

use crate::contract::World;
use crate::report::{config_digest, RunReport};

/// Engine selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    AStar,
    Greedy,
    BoundedAStar,
    IdaStar,
    MultiAStar,
    Beam,
    Mcts,
}

impl EngineKind {
    pub const ALL: [EngineKind; 7] = [
        Self::AStar,
        Self::Greedy,
        Self::BoundedAStar,
        Self::IdaStar,
        Self::MultiAStar,
        Self::Beam,
        Self::Mcts,
    ];

    /// The name the engine reports for itself.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AStar => "astar",
            Self::Greedy => "greedy",
            Self::BoundedAStar => "bounded_astar",
            Self::IdaStar => "ida",
            Self::MultiAStar => "multi_astar",
            Self::Beam => "beam",
            Self::Mcts => "mcts",
        }
    }

    /// Whether the engine guarantees an optimal plan under an admissible,
    /// consistent heuristic.
    #[must_use]
    pub fn is_optimal(self) -> bool {
        matches!(self, Self::AStar | Self::IdaStar | Self::MultiAStar)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| RunError::UnknownEngine { name: s.to_owned() })
    }
}

/// What to run.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub engine: EngineKind,
    pub config: SearchConfig,
    /// f-bound for [`EngineKind::BoundedAStar`]; ignored otherwise.
    pub f_bound: f64,
}

impl RunSpec {
    /// Default configuration, unbounded f.
    #[must_use]
    pub fn new(engine: EngineKind) -> Self {
        Self {
            engine,
            config: SearchConfig::default(),
            f_bound: f64::INFINITY,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_f_bound(mut self, bound: f64) -> Self {
        self.f_bound = bound;
        self
    }
}

/// Error during a harness run.
///
/// Budget exhaustion, unsolvability and collaborator panics are reported in
/// the [`RunReport`], not here.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("unknown engine `{name}`")]
    UnknownEngine { name: String },
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("canonical JSON error: {0}")]
    Canon(#[from] CanonError),
}

/// Box the engine `spec` names, wired to the world's heuristics.
#[must_use]
pub fn build_planner<W>(world: &W, spec: &RunSpec) -> Box<dyn Planner<W>>
where
    W: World + 'static,
{
    let config = spec.config.clone();
    let primary: Box<dyn Heuristic<W::State>> = world
        .heuristics()
        .into_iter()
        .next()
        .unwrap_or_else(|| Box::new(ZeroHeuristic));
    match spec.engine {
        EngineKind::AStar => Box::new(AStar::new(primary, config)),
        EngineKind::Greedy => Box::new(GreedyBestFirst::new(primary, config)),
        EngineKind::BoundedAStar => Box::new(BoundedAStar::new(primary, spec.f_bound, config)),
        EngineKind::IdaStar => Box::new(IdaStar::new(primary, config)),
        EngineKind::MultiAStar => {
            let mut all = world.heuristics();
            if all.is_empty() {
                all.push(Box::new(ZeroHeuristic));
            }
            Box::new(MultiHeuristicAStar::new(all, config))
        }
        EngineKind::Beam => Box::new(BeamStackSearch::new(primary, config)),
        EngineKind::Mcts => Box::new(MctsSolver::new(primary, config)),
    }
}

/// Run `spec` over `world` and report.
///
/// # Errors
///
/// Returns [`RunError::Search`] for a rejected configuration or a plan that
/// fails replay, and [`RunError::Canon`] if the report cannot be
/// canonicalized.
pub fn run_engine<W>(world: &W, spec: &RunSpec) -> Result<RunReport, RunError>
where
    W: World + 'static,
{
    let digest = config_digest(&spec.config)?;
    let mut planner = build_planner(world, spec);
    let engine = planner.name();

    let solved = panic::catch_unwind(AssertUnwindSafe(|| planner.solve(world)));
    let outcome = match solved {
        Ok(result) => result?,
        Err(_) => {
            return Ok(RunReport::canceled(
                engine,
                world.world_id(),
                digest,
                TerminationReason::InternalPanic {
                    stage: PanicStage::Solve,
                },
                SearchStats::default(),
            ))
        }
    };

    if let Some(plan) = &outcome.plan {
        let replayed = panic::catch_unwind(AssertUnwindSafe(|| plan.replay(world)));
        match replayed {
            Ok(result) => {
                result?;
            }
            Err(_) => {
                return Ok(RunReport::canceled(
                    engine,
                    world.world_id(),
                    digest,
                    TerminationReason::InternalPanic {
                        stage: PanicStage::PlanReplay,
                    },
                    outcome.stats,
                ))
            }
        }
    }

    Ok(RunReport::from_outcome(
        engine,
        world.world_id(),
        digest,
        outcome,
    )?)
}
