//! Property tests for the Monte-Carlo tree search engine.
//!
//! Proves:
//! 1. Equal seeds give identical runs; the seed is the only source of
//!    randomness
//! 2. Every node's cached subtree size is one plus its children's
//! 3. Any plan returned replays to a goal
//! 4. A node budget stops the run but keeps the best plan found so far

use lock_tests::fixtures::{corridor_maze, diamond};
use meridian_harness::worlds::puzzle::{Manhattan, SlidingPuzzle};
use meridian_search::mcts::{MctsSearch, RolloutPolicy};
use meridian_search::trace::TerminationReason;
use meridian_search::{MctsSolver, Planner, SearchConfig, SearchStatus};
use proptest::prelude::*;

fn config(seed: u64) -> SearchConfig {
    let mut config = SearchConfig {
        record_trace: true,
        ..SearchConfig::default()
    };
    config.mcts.patience = 150;
    config.mcts.step_batch = 40;
    config.mcts.seed = seed;
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn same_seed_same_trace(seed in any::<u64>()) {
        let maze = corridor_maze();
        let run = || {
            let mut solver = MctsSolver::new(maze.nearest_goal(), config(seed));
            let outcome = solver.solve(&maze).unwrap();
            (
                outcome.stats.iterations,
                outcome.plan.map(|p| p.to_string()),
                outcome.trace.unwrap().digest().unwrap(),
            )
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn plans_replay(seed in any::<u64>()) {
        let puzzle = SlidingPuzzle::scrambled(10, seed);
        let mut solver = MctsSolver::new(Manhattan, config(seed));
        let outcome = solver.solve(&puzzle).unwrap();
        if let Some(plan) = &outcome.plan {
            prop_assert_eq!(plan.replay(&puzzle).unwrap(), plan.cost());
        }
    }

    #[test]
    fn subtree_sizes_stay_consistent(seed in 0u64..1000) {
        let maze = corridor_maze();
        let h = maze.nearest_goal();
        let cfg = config(seed);
        let mut search = MctsSearch::new(&maze, &h, &cfg, &RolloutPolicy::standard(3)).unwrap();
        for _ in 0..60 {
            if search.step().is_some() {
                break;
            }
            prop_assert_eq!(search.recalculate_subtree_sizes(), search.tree().len());
            let tree = search.tree();
            for id in tree.ids() {
                let node = tree.node(id);
                let below: usize = node.children().iter().map(|&c| tree.subtree_size(c)).sum();
                prop_assert_eq!(tree.subtree_size(id), 1 + below);
            }
        }
    }
}

#[test]
fn each_rollout_policy_alone_solves_diamond() {
    let world = diamond();
    for policy in RolloutPolicy::standard(3) {
        let mut solver =
            MctsSolver::new(world.table_heuristic(), config(1)).with_rollouts(vec![policy]);
        let outcome = solver.solve(&world).unwrap();
        assert_eq!(outcome.status, SearchStatus::SolutionFound, "{}", policy.name());
        assert!(outcome.plan_cost().unwrap() >= 3);
    }
}

#[test]
fn node_budget_keeps_best_plan() {
    let maze = corridor_maze();
    let mut limited = config(9);
    limited.max_nodes = 6;
    let mut solver = MctsSolver::new(maze.nearest_goal(), limited);
    let outcome = solver.solve(&maze).unwrap();
    assert!(matches!(
        outcome.termination,
        TerminationReason::NodeLimit { .. }
            | TerminationReason::PatienceExhausted { .. }
            | TerminationReason::RootExhausted
    ));
    if matches!(outcome.termination, TerminationReason::NodeLimit { .. }) {
        assert_eq!(outcome.status, SearchStatus::MemoryLimitExceeded);
    }
    if let Some(plan) = outcome.plan {
        assert_eq!(plan.replay(&maze).unwrap(), plan.cost());
    }
}

#[test]
fn traces_record_one_rollout_per_simulated_iteration() {
    let world = diamond();
    let mut solver = MctsSolver::new(world.table_heuristic(), config(4));
    let outcome = solver.solve(&world).unwrap();
    let trace = outcome.trace.unwrap();
    assert_eq!(trace.expansions(), 0);
    assert!(!trace.events.is_empty());
    assert!(trace.events.len() as u64 <= outcome.stats.iterations);
}
