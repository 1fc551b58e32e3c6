//! Optimality and plan validity over generated graphs and puzzles.
//!
//! Proves:
//! 1. A*, IDA* and multi-heuristic A* return the reference optimum under a
//!    consistent heuristic
//! 2. Every plan any engine returns replays to a goal at its recorded cost
//! 3. Engines agree on solvability

use lock_tests::fixtures::{
    corridor_maze, costs_to_goal, generated_graph, puzzles, RawEdge, CORRIDOR_OPTIMUM,
};
use meridian_harness::runner::{run_engine, EngineKind, RunSpec};
use meridian_kernel::model::{Heuristic, Problem, ZeroHeuristic};
use meridian_search::{AStar, IdaStar, Planner, SearchConfig, SearchStatus};
use proptest::prelude::*;

const MAX_NODES: usize = 9;

fn arb_graph() -> impl Strategy<Value = (usize, Vec<RawEdge>)> {
    (3usize..MAX_NODES).prop_flat_map(|n| {
        let edge = (0..n, 0..n, 1u32..6).prop_map(|(from, to, cost)| RawEdge { from, to, cost });
        (Just(n), prop::collection::vec(edge, 0..n * 3))
    })
}

fn arb_scale() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(0.5), Just(1.0)]
}

fn mcts_config() -> SearchConfig {
    let mut config = SearchConfig::default();
    config.mcts.patience = 100;
    config.mcts.step_batch = 30;
    config
}

// ---------------------------------------------------------------------------
// 1. Optimal engines hit the reference optimum
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn optimal_engines_match_reference((n, edges) in arb_graph(), scale in arb_scale()) {
        let world = generated_graph(n, &edges, scale);
        let reference = costs_to_goal(n, &edges, n - 1)[0];

        for kind in EngineKind::ALL.into_iter().filter(|k| k.is_optimal()) {
            let report = run_engine(&world, &RunSpec::new(kind)).unwrap();
            match reference {
                Some(cost) => {
                    prop_assert_eq!(report.status, SearchStatus::SolutionFound, "{}", kind);
                    prop_assert_eq!(report.plan.as_ref().unwrap().cost, cost, "{}", kind);
                }
                None => {
                    prop_assert_eq!(report.status, SearchStatus::NoSolutionExist, "{}", kind);
                }
            }
        }
    }

    #[test]
    fn suboptimal_engines_never_beat_reference((n, edges) in arb_graph()) {
        let world = generated_graph(n, &edges, 1.0);
        let reference = costs_to_goal(n, &edges, n - 1)[0];

        for kind in [EngineKind::Greedy, EngineKind::Beam, EngineKind::Mcts] {
            let spec = RunSpec::new(kind).with_config(mcts_config());
            let report = run_engine(&world, &spec).unwrap();
            if let Some(plan) = &report.plan {
                let optimum = reference.unwrap();
                prop_assert!(plan.cost >= optimum, "{} beat the optimum", kind);
            }
            if reference.is_none() {
                prop_assert_eq!(report.status, SearchStatus::NoSolutionExist, "{}", kind);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Puzzles and mazes
// ---------------------------------------------------------------------------

fn astar_cost<P: Problem, H: Heuristic<P::State>>(problem: &P, h: H) -> u64 {
    let mut solver = AStar::new(h, SearchConfig::default());
    let outcome = solver.solve(problem).unwrap();
    assert_eq!(outcome.status, SearchStatus::SolutionFound);
    let plan = outcome.plan.unwrap();
    assert_eq!(plan.replay(problem).unwrap(), plan.cost());
    plan.cost()
}

#[test]
fn puzzle_heuristics_agree_on_optimum() {
    use meridian_harness::worlds::puzzle::{Manhattan, MisplacedTiles};
    for puzzle in puzzles() {
        let manhattan = astar_cost(&puzzle, Manhattan);
        assert_eq!(astar_cost(&puzzle, MisplacedTiles), manhattan);

        let mut ida = IdaStar::new(Manhattan, SearchConfig::default());
        let outcome = ida.solve(&puzzle).unwrap();
        assert_eq!(outcome.plan_cost(), Some(manhattan));
    }
}

#[test]
fn blind_search_matches_informed_on_small_puzzle() {
    use meridian_harness::worlds::puzzle::Manhattan;
    let all = puzzles();
    let puzzle = &all[0];
    assert_eq!(astar_cost(puzzle, ZeroHeuristic), astar_cost(puzzle, Manhattan));
}

#[test]
fn maze_optimum() {
    let maze = corridor_maze();
    for kind in EngineKind::ALL.into_iter().filter(|k| k.is_optimal()) {
        let report = run_engine(&maze, &RunSpec::new(kind)).unwrap();
        assert_eq!(report.plan.as_ref().unwrap().cost, CORRIDOR_OPTIMUM, "{kind}");
    }
}

#[test]
fn unsolvable_puzzle_is_detected_by_exhaustion() {
    use meridian_harness::worlds::puzzle::{Board, SlidingPuzzle};
    let swapped = [2, 1, 3, 4, 5, 6, 7, 8, 0];
    assert!(!Board(swapped).is_solvable());
    let puzzle = SlidingPuzzle::new("swapped", swapped).unwrap();
    let report = run_engine(&puzzle, &RunSpec::new(EngineKind::AStar)).unwrap();
    assert_eq!(report.status, SearchStatus::NoSolutionExist);
    // Half of the 9! permutations are reachable.
    assert_eq!(report.stats.expanded, 181_440);
}
