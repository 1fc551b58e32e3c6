//! Best-first loop invariants, observed through the search trace.
//!
//! Proves:
//! 1. A* with a consistent heuristic never expands a state twice
//! 2. Heap frontiers produce identical traces; sequential ones still find
//!    valid plans
//! 3. Beam search keeps at most `beam_width` successors per expansion
//! 4. Expansion order numbers are dense and the trace count matches stats

use std::collections::BTreeSet;

use lock_tests::fixtures::{corridor_maze, diamond, puzzles};
use meridian_harness::worlds::puzzle::Manhattan;
use meridian_kernel::model::{Heuristic, Problem};
use meridian_search::trace::{ExpandEvent, SearchTrace, TraceEvent};
use meridian_search::{
    AStar, BeamStackSearch, FrontierKind, Planner, SearchConfig, SearchOutcome, SearchStatus,
};

fn traced(frontier: FrontierKind) -> SearchConfig {
    SearchConfig {
        record_trace: true,
        frontier,
        ..SearchConfig::default()
    }
}

fn expansions(trace: &SearchTrace) -> Vec<&ExpandEvent> {
    trace
        .events
        .iter()
        .filter_map(|e| match e {
            TraceEvent::Expand(x) => Some(x),
            _ => None,
        })
        .collect()
}

fn astar<P: Problem, H: Heuristic<P::State>>(
    problem: &P,
    h: H,
    frontier: FrontierKind,
) -> SearchOutcome<P::Op> {
    AStar::new(h, traced(frontier)).solve(problem).unwrap()
}

// ---------------------------------------------------------------------------
// 1. No re-expansion
// ---------------------------------------------------------------------------

#[test]
fn consistent_heuristic_expands_each_state_once() {
    for puzzle in puzzles() {
        let outcome = astar(&puzzle, Manhattan, FrontierKind::BinaryHeap);
        let trace = outcome.trace.unwrap();
        let events = expansions(&trace);
        let distinct: BTreeSet<usize> = events.iter().map(|e| e.node).collect();
        assert_eq!(distinct.len(), events.len());
        assert_eq!(outcome.stats.reopened, 0);
    }

    let maze = corridor_maze();
    let outcome = astar(&maze, maze.nearest_goal(), FrontierKind::BinaryHeap);
    let trace = outcome.trace.unwrap();
    let events = expansions(&trace);
    let distinct: BTreeSet<usize> = events.iter().map(|e| e.node).collect();
    assert_eq!(distinct.len(), events.len());
}

#[test]
fn popped_f_values_never_decrease() {
    let all = puzzles();
    let outcome = astar(&all[3], Manhattan, FrontierKind::BinaryHeap);
    let trace = outcome.trace.unwrap();
    let keys: Vec<f64> = expansions(&trace).iter().map(|e| e.pop_key.primary).collect();
    assert!(keys.windows(2).all(|w| w[0] <= w[1]));
}

// ---------------------------------------------------------------------------
// 2. Frontier kinds
// ---------------------------------------------------------------------------

#[test]
fn heap_frontiers_produce_identical_traces() {
    for puzzle in puzzles() {
        let binary = astar(&puzzle, Manhattan, FrontierKind::BinaryHeap);
        let fib = astar(&puzzle, Manhattan, FrontierKind::FibonacciHeap);
        assert_eq!(
            binary.trace.unwrap().digest().unwrap(),
            fib.trace.unwrap().digest().unwrap()
        );
        assert_eq!(binary.plan, fib.plan);
    }
}

#[test]
fn sequential_frontiers_find_valid_plans() {
    let world = diamond();
    for kind in [FrontierKind::Stack, FrontierKind::Queue] {
        let outcome = astar(&world, world.table_heuristic(), kind);
        assert_eq!(outcome.status, SearchStatus::SolutionFound, "{}", kind.as_str());
        let plan = outcome.plan.unwrap();
        assert_eq!(plan.replay(&world).unwrap(), plan.cost());
    }
}

// ---------------------------------------------------------------------------
// 3. Beam width
// ---------------------------------------------------------------------------

#[test]
fn beam_keeps_at_most_width_successors() {
    let maze = corridor_maze();
    for width in 1..=3usize {
        let config = SearchConfig {
            beam_width: width,
            ..traced(FrontierKind::BinaryHeap)
        };
        let mut beam = BeamStackSearch::new(maze.nearest_goal(), config);
        let outcome = beam.solve(&maze).unwrap();
        let trace = outcome.trace.unwrap();
        for e in expansions(&trace) {
            let kept = e.successors.inserted + e.successors.improved;
            assert!(kept as usize <= width, "width {width}: kept {kept}");
        }
    }
}

#[test]
fn wide_beam_matches_astar_cost() {
    for puzzle in puzzles().into_iter().take(2) {
        let exact = astar(&puzzle, Manhattan, FrontierKind::BinaryHeap);
        let config = SearchConfig {
            beam_width: 4,
            ..SearchConfig::default()
        };
        let beam = BeamStackSearch::new(Manhattan, config).solve(&puzzle).unwrap();
        // At most four moves exist, so a width-4 beam filters nothing.
        assert_eq!(beam.plan_cost(), exact.plan_cost());
    }
}

// ---------------------------------------------------------------------------
// 4. Trace bookkeeping
// ---------------------------------------------------------------------------

#[test]
fn expansion_order_is_dense_and_counted() {
    let all = puzzles();
    let outcome = astar(&all[2], Manhattan, FrontierKind::FibonacciHeap);
    let trace = outcome.trace.unwrap();
    let events = expansions(&trace);
    for (i, e) in events.iter().enumerate() {
        assert_eq!(e.order, i as u64);
    }
    assert_eq!(events.len() as u64, outcome.stats.expanded);
    assert_eq!(trace.termination, outcome.termination);
}
