//! End-to-end acceptance scenarios over hand-built worlds.
//!
//! Every run goes through the harness runner, so each found plan has also
//! been replayed against the world.

use lock_tests::fixtures::{dead_end_root, diamond, goal_at_root, unsolvable};
use meridian_harness::runner::{run_engine, EngineKind, RunSpec};
use meridian_harness::worlds::graph::GraphWorld;
use meridian_kernel::model::Operator;
use meridian_search::trace::TerminationReason;
use meridian_search::{AStar, IdaStar, Planner, SearchConfig, SearchStatus};

fn config() -> SearchConfig {
    let mut config = SearchConfig::default();
    config.mcts.patience = 300;
    config
}

// ---------------------------------------------------------------------------
// Solvable
// ---------------------------------------------------------------------------

#[test]
fn line_abc_plan_is_a_then_b() {
    let world = GraphWorld::line_abc();
    let report = run_engine(&world, &RunSpec::new(EngineKind::AStar)).unwrap();
    assert_eq!(report.status, SearchStatus::SolutionFound);
    assert!(report.solution_found());
    let plan = report.plan.as_ref().unwrap();
    assert_eq!(plan.text, "<A→B, B→C>");
    assert_eq!(plan.operators, vec!["A→B", "B→C"]);
    assert_eq!(plan.cost, 2);
    assert_eq!(report.plan_length(), 2);
    assert!(matches!(
        report.termination,
        TerminationReason::GoalReached { .. }
    ));
}

#[test]
fn plan_length_is_the_sum_of_operator_costs() {
    let world = GraphWorld::new("weighted")
        .edge("A", "B", 3)
        .edge("B", "C", 4)
        .goal("C");

    let report = run_engine(&world, &RunSpec::new(EngineKind::AStar)).unwrap();
    let plan = report.plan.as_ref().unwrap();
    assert_eq!(plan.text, "<A→B, B→C>");
    assert_eq!(report.plan_length(), 7);
    assert_eq!(report.operator_count(), 2);

    let mut astar = AStar::new(world.table_heuristic(), SearchConfig::default());
    let outcome = astar.solve(&world).unwrap();
    let summed: u64 = outcome
        .plan
        .as_ref()
        .unwrap()
        .operators()
        .iter()
        .map(|op| u64::from(op.cost()))
        .sum();
    assert_eq!(outcome.plan_length(), summed);
    assert_eq!(outcome.plan_length(), 7);
    assert_eq!(outcome.operator_count(), 2);
}

#[test]
fn optimal_engines_take_the_cheap_long_way() {
    let world = diamond();
    for kind in EngineKind::ALL.into_iter().filter(|k| k.is_optimal()) {
        let report = run_engine(&world, &RunSpec::new(kind).with_config(config())).unwrap();
        assert_eq!(report.status, SearchStatus::SolutionFound, "{kind}");
        let plan = report.plan.as_ref().unwrap();
        assert_eq!(plan.text, "<S→A, A→B, B→G>", "{kind}");
        assert_eq!(plan.cost, 3, "{kind}");
    }
}

#[test]
fn every_engine_solves_diamond() {
    let world = diamond();
    for kind in EngineKind::ALL {
        let report = run_engine(&world, &RunSpec::new(kind).with_config(config())).unwrap();
        assert_eq!(report.status, SearchStatus::SolutionFound, "{kind}");
        assert!(report.plan.as_ref().unwrap().cost >= 3, "{kind}");
    }
}

#[test]
fn goal_at_root_yields_empty_plan() {
    let world = goal_at_root();
    for kind in EngineKind::ALL {
        let report = run_engine(&world, &RunSpec::new(kind).with_config(config())).unwrap();
        assert_eq!(report.status, SearchStatus::SolutionFound, "{kind}");
        let plan = report.plan.as_ref().unwrap();
        assert_eq!(plan.text, "<>", "{kind}");
        assert_eq!(plan.cost, 0, "{kind}");
    }
}

#[test]
fn bounded_astar_respects_bound() {
    let world = diamond();
    // Every path costs at least 3, so f = g + h > 2.5 for some node on each.
    let spec = RunSpec::new(EngineKind::BoundedAStar).with_f_bound(2.5);
    let report = run_engine(&world, &spec).unwrap();
    assert_eq!(report.status, SearchStatus::NoSolutionExist);
    assert!(report.stats.pruned > 0);

    let spec = RunSpec::new(EngineKind::BoundedAStar).with_f_bound(3.0);
    let report = run_engine(&world, &spec).unwrap();
    assert_eq!(report.status, SearchStatus::SolutionFound);
    assert_eq!(report.plan.as_ref().unwrap().cost, 3);
}

// ---------------------------------------------------------------------------
// Unsolvable
// ---------------------------------------------------------------------------

#[test]
fn unreachable_goal_is_no_solution() {
    let world = unsolvable();
    for kind in EngineKind::ALL {
        let report = run_engine(&world, &RunSpec::new(kind).with_config(config())).unwrap();
        assert_eq!(report.status, SearchStatus::NoSolutionExist, "{kind}");
        assert!(report.plan.is_none(), "{kind}");
    }
}

#[test]
fn dead_end_root_exhausts_frontier() {
    let world = dead_end_root();
    for kind in EngineKind::ALL {
        let report = run_engine(&world, &RunSpec::new(kind)).unwrap();
        assert_eq!(report.status, SearchStatus::NoSolutionExist, "{kind}");
        assert_eq!(report.stats.expanded, 0, "{kind}");
        assert!(report.plan.is_none(), "{kind}");
        // The tree search proves the root hopeless by finishing it instead.
        let expected = if kind == EngineKind::Mcts {
            TerminationReason::RootExhausted
        } else {
            TerminationReason::FrontierExhausted
        };
        assert_eq!(report.termination, expected, "{kind}");
    }
}

#[test]
fn ida_tries_no_bound_on_dead_end_root() {
    let world = dead_end_root();
    let mut ida = IdaStar::new(world.table_heuristic(), SearchConfig::default());
    let outcome = ida.solve(&world).unwrap();
    assert_eq!(outcome.status, SearchStatus::NoSolutionExist);
    assert_eq!(outcome.termination, TerminationReason::FrontierExhausted);
    assert!(outcome.ida_bounds.is_empty());
    assert_eq!(outcome.stats.iterations, 0);
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

#[test]
fn one_node_budget_is_memory_limit() {
    let world = GraphWorld::line_abc();
    let limited = SearchConfig {
        max_nodes: 1,
        ..SearchConfig::default()
    };
    for kind in [
        EngineKind::AStar,
        EngineKind::Greedy,
        EngineKind::MultiAStar,
        EngineKind::Beam,
        EngineKind::IdaStar,
    ] {
        let report = run_engine(&world, &RunSpec::new(kind).with_config(limited.clone())).unwrap();
        assert_eq!(report.status, SearchStatus::MemoryLimitExceeded, "{kind}");
        assert!(matches!(
            report.termination,
            TerminationReason::NodeLimit { .. }
        ));
        assert!(report.plan.is_none(), "{kind}");
    }
}

#[test]
fn zero_time_budget_is_time_limit() {
    let world = diamond();
    let rushed = SearchConfig {
        time_limit: std::time::Duration::ZERO,
        ..SearchConfig::default()
    };
    let report = run_engine(&world, &RunSpec::new(EngineKind::AStar).with_config(rushed)).unwrap();
    assert_eq!(report.status, SearchStatus::TimeLimitExceeded);
    assert_eq!(report.termination, TerminationReason::TimeLimit);
}
