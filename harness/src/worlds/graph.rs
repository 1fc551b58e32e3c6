//! `GraphWorld`: an explicit weighted digraph with a heuristic table.
//!
//! Nodes are named; edges render as `from→to`. Used for hand-built instances
//! with a known optimum and for unsolvable graphs.

use std::collections::BTreeMap;
use std::fmt;

use meridian_kernel::model::{Heuristic, Operator, Problem, Successor, ZeroHeuristic};

use crate::contract::World;

/// A directed edge. The state is the node index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
    pub cost: u32,
    /// Insertion order across the whole graph.
    index: usize,
    label: String,
}

impl fmt::Display for GraphEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Operator<usize> for GraphEdge {
    fn cost(&self) -> u32 {
        self.cost
    }

    fn order_index(&self) -> usize {
        self.index
    }

    fn apply(&self, _state: &usize) -> usize {
        self.to
    }
}

/// Per-node heuristic values; unknown nodes estimate `0`.
#[derive(Debug, Clone)]
pub struct TableHeuristic {
    values: Vec<f64>,
}

impl Heuristic<usize> for TableHeuristic {
    fn value(&self, state: &usize) -> f64 {
        self.values.get(*state).copied().unwrap_or(0.0)
    }

    fn name(&self) -> &str {
        "table"
    }
}

/// Explicit weighted digraph, built with chained calls.
#[derive(Debug, Clone)]
pub struct GraphWorld {
    id: String,
    names: Vec<String>,
    lookup: BTreeMap<String, usize>,
    out: Vec<Vec<GraphEdge>>,
    edge_count: usize,
    start: usize,
    goals: Vec<bool>,
    h: Vec<f64>,
}

impl GraphWorld {
    /// An empty graph. The first node mentioned becomes the start unless
    /// [`GraphWorld::start`] says otherwise.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            names: Vec::new(),
            lookup: BTreeMap::new(),
            out: Vec::new(),
            edge_count: 0,
            start: 0,
            goals: Vec::new(),
            h: Vec::new(),
        }
    }

    /// `A -1-> B -1-> C`, goal `C`, `h = 2, 1, 0`.
    #[must_use]
    pub fn line_abc() -> Self {
        Self::new("line_abc")
            .edge("A", "B", 1)
            .edge("B", "C", 1)
            .goal("C")
            .h("A", 2.0)
            .h("B", 1.0)
            .h("C", 0.0)
    }

    fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_owned());
        self.lookup.insert(name.to_owned(), id);
        self.out.push(Vec::new());
        self.goals.push(false);
        self.h.push(0.0);
        id
    }

    #[must_use]
    pub fn node(mut self, name: &str) -> Self {
        self.intern(name);
        self
    }

    #[must_use]
    pub fn edge(mut self, from: &str, to: &str, cost: u32) -> Self {
        let (f, t) = (self.intern(from), self.intern(to));
        let label = format!("{from}→{to}");
        self.out[f].push(GraphEdge {
            from: f,
            to: t,
            cost,
            index: self.edge_count,
            label,
        });
        self.edge_count += 1;
        self
    }

    #[must_use]
    pub fn start(mut self, name: &str) -> Self {
        self.start = self.intern(name);
        self
    }

    #[must_use]
    pub fn goal(mut self, name: &str) -> Self {
        let id = self.intern(name);
        self.goals[id] = true;
        self
    }

    #[must_use]
    pub fn h(mut self, name: &str, value: f64) -> Self {
        let id = self.intern(name);
        self.h[id] = value;
        self
    }

    #[must_use]
    pub fn node_id(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// # Panics
    ///
    /// Panics if `id` is not a node of this graph.
    #[must_use]
    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn table_heuristic(&self) -> TableHeuristic {
        TableHeuristic {
            values: self.h.clone(),
        }
    }
}

impl Problem for GraphWorld {
    type State = usize;
    type Op = GraphEdge;

    fn initial_state(&self) -> usize {
        self.start
    }

    fn is_goal(&self, state: &usize) -> bool {
        self.goals.get(*state).copied().unwrap_or(false)
    }

    fn all_successors<'s>(&self, state: &'s usize) -> Vec<Successor<'s, usize, GraphEdge>> {
        self.out
            .get(*state)
            .map(|edges| {
                edges
                    .iter()
                    .map(|e| Successor::new(e.clone(), state))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn all_predecessors(&self, state: &usize) -> Vec<(GraphEdge, usize)> {
        self.out
            .iter()
            .flatten()
            .filter(|e| e.to == *state)
            .map(|e| (e.clone(), e.from))
            .collect()
    }
}

impl World for GraphWorld {
    fn world_id(&self) -> &str {
        &self.id
    }

    fn heuristics(&self) -> Vec<Box<dyn Heuristic<usize>>> {
        vec![Box::new(self.table_heuristic()), Box::new(ZeroHeuristic)]
    }
}
