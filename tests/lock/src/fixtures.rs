//! Worlds with a known answer, plus a reference shortest-path oracle.

use meridian_harness::worlds::graph::GraphWorld;
use meridian_harness::worlds::maze::GridMaze;
use meridian_harness::worlds::puzzle::SlidingPuzzle;

/// `S -1-> A -1-> B -1-> G` beats `S -5-> G` and `S -4-> B`.
///
/// Heuristic table `S=2, A=1, B=1, G=0` is admissible and consistent.
/// Optimal plan: `<S→A, A→B, B→G>`, cost 3.
#[must_use]
pub fn diamond() -> GraphWorld {
    GraphWorld::new("diamond")
        .edge("S", "A", 1)
        .edge("S", "B", 4)
        .edge("S", "G", 5)
        .edge("A", "B", 1)
        .edge("B", "G", 1)
        .goal("G")
        .h("S", 2.0)
        .h("A", 1.0)
        .h("B", 1.0)
        .h("G", 0.0)
}

/// `S → A → B` with goal `Z` on no path.
#[must_use]
pub fn unsolvable() -> GraphWorld {
    GraphWorld::new("unsolvable")
        .edge("S", "A", 1)
        .edge("A", "B", 1)
        .edge("B", "S", 1)
        .node("Z")
        .goal("Z")
}

/// Start whose heuristic is infinite.
#[must_use]
pub fn dead_end_root() -> GraphWorld {
    GraphWorld::new("dead_end_root")
        .edge("S", "G", 1)
        .goal("G")
        .h("S", f64::INFINITY)
}

/// Start already satisfies the goal.
#[must_use]
pub fn goal_at_root() -> GraphWorld {
    GraphWorld::new("goal_at_root").edge("S", "A", 1).goal("S")
}

/// A maze with dead-end corridors.
pub const CORRIDOR_MAZE: &str = "
    S.#....
    .##.##.
    ...#...
    ##.#.#.
    ...G.#.
";

/// Shortest path length through [`CORRIDOR_MAZE`].
pub const CORRIDOR_OPTIMUM: u64 = 7;

/// # Panics
///
/// Panics if [`CORRIDOR_MAZE`] stops parsing.
#[must_use]
pub fn corridor_maze() -> GridMaze {
    GridMaze::parse("corridor", CORRIDOR_MAZE).unwrap()
}

/// Scrambled eight-puzzles of increasing depth.
#[must_use]
pub fn puzzles() -> Vec<SlidingPuzzle> {
    [(8, 1), (14, 2), (20, 3), (24, 7)]
        .into_iter()
        .map(|(moves, seed)| SlidingPuzzle::scrambled(moves, seed))
        .collect()
}

/// An edge of a generated graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEdge {
    pub from: usize,
    pub to: usize,
    pub cost: u32,
}

/// Cheapest cost from every node to `goal`, `None` where unreachable.
///
/// Bellman-Ford over the reversed edges; fine for the small graphs the
/// property tests generate.
#[must_use]
pub fn costs_to_goal(nodes: usize, edges: &[RawEdge], goal: usize) -> Vec<Option<u64>> {
    let mut dist: Vec<Option<u64>> = vec![None; nodes];
    dist[goal] = Some(0);
    for _ in 0..nodes {
        let mut changed = false;
        for e in edges {
            if let Some(d) = dist[e.to] {
                let via = d + u64::from(e.cost);
                if dist[e.from].is_none() || Some(via) < dist[e.from] {
                    dist[e.from] = Some(via);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    dist
}

/// Build a graph `n0 .. n{nodes-1}` from raw edges.
///
/// Start is `n0`, goal is the last node. The heuristic table is `scale`
/// times the exact cost to the goal (infinite where unreachable), which is
/// consistent for any `scale` in `[0, 1]`.
#[must_use]
pub fn generated_graph(nodes: usize, edges: &[RawEdge], scale: f64) -> GraphWorld {
    let goal = nodes - 1;
    let exact = costs_to_goal(nodes, edges, goal);
    let mut world = GraphWorld::new(format!("generated_{nodes}"));
    for i in 0..nodes {
        world = world.node(&format!("n{i}"));
    }
    for e in edges {
        world = world.edge(&format!("n{}", e.from), &format!("n{}", e.to), e.cost);
    }
    for (i, d) in exact.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let h = d.map_or(f64::INFINITY, |d| scale * d as f64);
        world = world.h(&format!("n{i}"), h);
    }
    world.start("n0").goal(&format!("n{goal}"))
}
