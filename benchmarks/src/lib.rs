//! Shared regimes and helpers for the meridian benchmark suites.

use meridian_harness::contract::World;
use meridian_harness::report::RunReport;
use meridian_harness::runner::{build_planner, run_engine, EngineKind, RunSpec};
use meridian_harness::worlds::maze::GridMaze;
use meridian_harness::worlds::puzzle::SlidingPuzzle;
use meridian_search::{Planner, SearchConfig, SearchStats};

/// A maze with a long detour around a central wall.
pub const DETOUR_MAZE: &str = "
    S.........#.........
    ..........#.........
    ..........#.........
    ..........#.........
    ..........#.........
    ..........#.........
    ..........#.........
    ..........#.........
    ..........#.........
    ....................
    ..........#........G
";

/// The world a regime searches.
pub enum RegimeWorld {
    Puzzle(SlidingPuzzle),
    Maze(GridMaze),
}

/// A named world plus the configuration every engine runs it with.
pub struct Regime {
    pub name: &'static str,
    pub world: RegimeWorld,
    pub config: SearchConfig,
}

/// Benchmark regimes, from a shallow puzzle to an open room that stresses
/// tie-breaking.
///
/// # Panics
///
/// Panics if [`DETOUR_MAZE`] stops parsing. Benchmark setup failures are fatal.
#[must_use]
pub fn regimes() -> Vec<Regime> {
    let mut config = SearchConfig::default();
    config.mcts.patience = 200;
    config.mcts.seed = 7;

    let detour = GridMaze::parse("detour", DETOUR_MAZE).expect("detour maze parses");
    vec![
        Regime {
            name: "puzzle_shallow",
            world: RegimeWorld::Puzzle(SlidingPuzzle::scrambled(12, 3)),
            config: config.clone(),
        },
        Regime {
            name: "puzzle_deep",
            world: RegimeWorld::Puzzle(SlidingPuzzle::scrambled(30, 11)),
            config: config.clone(),
        },
        Regime {
            name: "maze_detour",
            world: RegimeWorld::Maze(detour),
            config: config.clone(),
        },
        Regime {
            name: "open_room",
            world: RegimeWorld::Maze(GridMaze::open_room(24)),
            config,
        },
    ]
}

impl Regime {
    /// Engine-only run: planner construction and `solve`, no report.
    ///
    /// # Panics
    ///
    /// Panics if the engine rejects the configuration.
    #[must_use]
    pub fn solve_only(&self, kind: EngineKind) -> SearchStats {
        let spec = RunSpec::new(kind).with_config(self.config.clone());
        match &self.world {
            RegimeWorld::Puzzle(w) => solve_stats(w, &spec),
            RegimeWorld::Maze(w) => solve_stats(w, &spec),
        }
    }

    /// End-to-end run through the harness, including replay and digests.
    ///
    /// # Panics
    ///
    /// Panics if the run fails. Benchmark runs are expected to succeed.
    #[must_use]
    pub fn run_report(&self, kind: EngineKind) -> RunReport {
        self.run_report_with(kind, self.config.clone())
    }

    /// [`Regime::run_report`] with an explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics if the run fails.
    #[must_use]
    pub fn run_report_with(&self, kind: EngineKind, config: SearchConfig) -> RunReport {
        let spec = RunSpec::new(kind).with_config(config);
        let report = match &self.world {
            RegimeWorld::Puzzle(w) => run_engine(w, &spec),
            RegimeWorld::Maze(w) => run_engine(w, &spec),
        };
        report.expect("run_engine should succeed in benchmarks")
    }
}

fn solve_stats<W: World + 'static>(world: &W, spec: &RunSpec) -> SearchStats {
    let mut planner = build_planner(world, spec);
    planner
        .solve(world)
        .expect("solve should succeed in benchmarks")
        .stats
}

/// Engines worth timing on `regime`. IDA* re-expands heavily in open rooms,
/// so it is left out there.
#[must_use]
pub fn engines_for(regime: &Regime) -> Vec<EngineKind> {
    EngineKind::ALL
        .into_iter()
        .filter(|k| !(regime.name == "open_room" && *k == EngineKind::IdaStar))
        .collect()
}
