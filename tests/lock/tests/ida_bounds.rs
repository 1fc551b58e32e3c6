//! IDA* bound sequence lock tests.
//!
//! Proves:
//! 1. The first bound is `h(initial state)`
//! 2. Bounds strictly increase
//! 3. The final bound equals the plan cost under a consistent heuristic
//! 4. One bound event per iteration is traced

use lock_tests::fixtures::{diamond, puzzles, unsolvable};
use meridian_harness::worlds::puzzle::Manhattan;
use meridian_kernel::model::{Heuristic, Problem};
use meridian_search::trace::{TerminationReason, TraceEvent};
use meridian_search::{AStar, IdaStar, Planner, SearchConfig, SearchStatus};

fn traced() -> SearchConfig {
    SearchConfig {
        record_trace: true,
        ..SearchConfig::default()
    }
}

#[test]
fn diamond_bounds_are_two_then_three() {
    let world = diamond();
    let mut ida = IdaStar::new(world.table_heuristic(), traced());
    let outcome = ida.solve(&world).unwrap();
    assert_eq!(outcome.status, SearchStatus::SolutionFound);
    assert_eq!(outcome.ida_bounds, vec![2.0, 3.0]);
    assert_eq!(outcome.plan_cost(), Some(3));
    assert_eq!(outcome.stats.iterations, 2);
}

#[test]
fn puzzle_bounds_increase_to_optimum() {
    for puzzle in puzzles() {
        let mut astar = AStar::new(Manhattan, SearchConfig::default());
        let optimum = astar.solve(&puzzle).unwrap().plan_cost().unwrap();

        let mut ida = IdaStar::new(Manhattan, traced());
        let outcome = ida.solve(&puzzle).unwrap();
        assert_eq!(outcome.plan_cost(), Some(optimum));

        let bounds = &outcome.ida_bounds;
        assert_eq!(bounds[0], Manhattan.value(&puzzle.initial_state()));
        assert!(bounds.windows(2).all(|w| w[0] < w[1]), "{bounds:?}");
        #[allow(clippy::cast_precision_loss)]
        let last = optimum as f64;
        assert_eq!(*bounds.last().unwrap(), last);

        let trace = outcome.trace.unwrap();
        let traced_bounds: Vec<f64> = trace
            .events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Bound(b) => Some(b.bound),
                _ => None,
            })
            .collect();
        assert_eq!(&traced_bounds, bounds);
    }
}

#[test]
fn unsolvable_ends_with_bound_exhausted() {
    let world = unsolvable();
    let mut ida = IdaStar::new(world.table_heuristic(), SearchConfig::default());
    let outcome = ida.solve(&world).unwrap();
    assert_eq!(outcome.status, SearchStatus::NoSolutionExist);
    assert!(matches!(
        outcome.termination,
        TerminationReason::BoundExhausted { .. }
    ));
    assert!(outcome.ida_bounds.windows(2).all(|w| w[0] < w[1]));
}
