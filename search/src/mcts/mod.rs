//! Monte-Carlo tree search.
//!
//! Each iteration selects a leaf by UCB, expands it once it has been visited
//! often enough, simulates from the chosen node with one of the rollout
//! policies (round-robin), and backpropagates the score to the root. The
//! cheapest goal trajectory seen so far is kept and returned; a budget stop
//! still returns it.
//!
//! Scores are negated costs, so higher is better:
//!
//! - rollout reached a goal: `-(g + rollout_cost)`
//! - rollout stopped short: `-(g + rollout_cost + h_end + 1)`
//! - rollout hit a dead end: the worst score observed so far
//!
//! Nodes that can yield nothing further (goal leaves, dead ends, expanded
//! nodes whose children are all gone) are marked finished and pruned from
//! their parent, recursively. The run ends when the root is finished.

pub mod rollout;
pub mod tree;

use meridian_kernel::model::{Heuristic, Problem};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use rollout::{MctsContext, RolloutPolicy, RolloutResult};
pub use tree::{Tree, TreeId, TreeNode};

use crate::budget::Budget;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::outcome::{SearchOutcome, SearchStats, SearchStatus};
use crate::plan::SolutionPlan;
use crate::planner::Planner;
use crate::trace::{RolloutEvent, SearchTrace, TerminationReason, TraceEvent};

/// One MCTS run in progress.
///
/// [`MctsSolver`] drives a session to completion; tests and tools can step it
/// and inspect the tree between iterations.
pub struct MctsSearch<'p, P: Problem, H> {
    ctx: MctsContext<'p, P, H>,
    tree: Tree<P::State, P::Op>,
    config: SearchConfig,
    rollouts: Vec<RolloutPolicy>,
    budget: Budget,
    best: Option<SolutionPlan<P::Op>>,
    score_range: Option<(f64, f64)>,
    iterations: u64,
    since_improvement: u64,
    stats: SearchStats,
    trace: Option<SearchTrace>,
}

impl<'p, P, H> MctsSearch<'p, P, H>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    /// Validate `config` and plant the root.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] for a rejected configuration or
    /// an empty rollout list.
    pub fn new(
        problem: &'p P,
        heuristic: &'p H,
        config: &SearchConfig,
        rollouts: &[RolloutPolicy],
    ) -> Result<Self, SearchError> {
        config.validate()?;
        if rollouts.is_empty() {
            return Err(SearchError::invalid_config(
                "mcts needs at least one rollout policy",
            ));
        }
        problem.reset_transition_history();
        let rng = ChaCha8Rng::seed_from_u64(config.mcts.seed);
        Ok(Self {
            ctx: MctsContext::new(problem, heuristic, rng),
            tree: Tree::new(problem.initial_state()),
            config: config.clone(),
            rollouts: rollouts.to_vec(),
            budget: Budget::start(config),
            best: None,
            score_range: None,
            iterations: 0,
            since_improvement: 0,
            stats: SearchStats::default(),
            trace: config.record_trace.then(|| SearchTrace::new("mcts")),
        })
    }

    #[must_use]
    pub fn tree(&self) -> &Tree<P::State, P::Op> {
        &self.tree
    }

    /// Recompute the tree's cached subtree sizes.
    pub fn recalculate_subtree_sizes(&mut self) -> usize {
        self.tree.recalculate_subtree_sizes()
    }

    /// Cheapest goal trajectory found so far.
    #[must_use]
    pub fn best(&self) -> Option<&SolutionPlan<P::Op>> {
        self.best.as_ref()
    }

    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Iterate until a stop condition holds.
    pub fn run(&mut self) -> TerminationReason {
        loop {
            if let Some(reason) = self.step() {
                if let Some(trace) = self.trace.as_mut() {
                    trace.termination = reason.clone();
                }
                return reason;
            }
        }
    }

    /// Run one iteration. Returns the reason to stop, if any.
    pub fn step(&mut self) -> Option<TerminationReason> {
        if self.tree.node(Tree::<P::State, P::Op>::ROOT).finished {
            return Some(TerminationReason::RootExhausted);
        }
        if self.budget.time_exceeded() {
            return Some(TerminationReason::TimeLimit);
        }

        let leaf = self.select();
        if self.tree.node(leaf).expanded {
            // Every child was pruned after the last expansion.
            self.finish(leaf);
            return None;
        }

        let threshold = u64::from(self.config.mcts.expansion_threshold);
        let target = if self.tree.node(leaf).visits > threshold {
            match self.expand(leaf) {
                Err(reason) => return Some(reason),
                Ok(Some(child)) => child,
                Ok(None) => {
                    let score = self.dead_end_score(self.tree.node(leaf).g);
                    self.backpropagate(leaf, score, &[]);
                    self.finish(leaf);
                    return self.after_iteration(false, None);
                }
            }
        } else {
            leaf
        };
        if self.budget.nodes_exceeded(self.tree.len()) {
            return Some(TerminationReason::NodeLimit {
                stored: self.tree.len(),
            });
        }

        let slot = usize::try_from(self.iterations).unwrap_or(0) % self.rollouts.len();
        let policy = self.rollouts[slot];
        let Some(start) = self.tree.node(target).state.clone() else {
            return Some(TerminationReason::FrontierInvariantViolation);
        };
        let result = rollout::rollout(
            &mut self.ctx,
            policy,
            &start,
            self.config.mcts.step_batch,
            &self.budget,
        );

        let g = self.tree.node(target).g;
        let total = g + result.cost;
        #[allow(clippy::cast_precision_loss)]
        let score = if result.reached_goal {
            -(total as f64)
        } else if result.dead_end {
            self.dead_end_score(total)
        } else {
            -(total as f64 + result.h_end + 1.0)
        };

        let improved = result.reached_goal && self.record_trajectory(target, &result);
        self.backpropagate(target, score, &result.operators);
        if let Some(trace) = self.trace.as_mut() {
            trace.push(TraceEvent::Rollout(RolloutEvent {
                iteration: self.iterations,
                policy: policy.name(),
                steps: result.operators.len(),
                score,
                reached_goal: result.reached_goal,
            }));
        }
        if result.operators.is_empty() && (result.reached_goal || result.dead_end) {
            self.finish(target);
        }
        let timed_out = result.timed_out.then_some(TerminationReason::TimeLimit);
        self.after_iteration(improved, timed_out)
    }

    fn after_iteration(
        &mut self,
        improved: bool,
        stop: Option<TerminationReason>,
    ) -> Option<TerminationReason> {
        self.iterations += 1;
        if improved {
            self.since_improvement = 0;
        } else {
            self.since_improvement += 1;
        }
        if stop.is_some() {
            return stop;
        }
        (self.since_improvement >= self.config.mcts.patience).then_some(
            TerminationReason::PatienceExhausted {
                iterations: self.iterations,
            },
        )
    }

    /// Descend from the root through UCB choices to an unexpanded node.
    fn select(&self) -> TreeId {
        let mut id = Tree::<P::State, P::Op>::ROOT;
        while self.tree.node(id).expanded {
            match self.pick_child(id) {
                Some(child) => id = child,
                None => break,
            }
        }
        id
    }

    /// UCB1 over the unfinished children; the first unvisited child wins.
    #[allow(clippy::cast_precision_loss)]
    fn pick_child(&self, id: TreeId) -> Option<TreeId> {
        let node = self.tree.node(id);
        let ln_n = (node.visits.max(1) as f64).ln();
        let bias = self.bias();
        let mut best: Option<(TreeId, f64)> = None;
        for &c in &node.children {
            let child = self.tree.node(c);
            if child.finished {
                continue;
            }
            let Some(mean) = child.mean_score() else {
                return Some(c);
            };
            let ucb = mean + bias * (ln_n / child.visits as f64).sqrt();
            match best {
                Some((_, b)) if ucb <= b => {}
                _ => best = Some((c, ucb)),
            }
        }
        best.map(|(c, _)| c)
    }

    /// Exploration weight scaled to the observed score spread.
    fn bias(&self) -> f64 {
        let exploration = self.config.mcts.exploration;
        match self.score_range {
            Some((lo, hi)) if hi > lo => exploration * (hi - lo),
            _ => exploration,
        }
    }

    /// Turn every successor with a finite heuristic into a child and release
    /// the leaf's state. Returns the first child, `None` if there is none.
    fn expand(&mut self, leaf: TreeId) -> Result<Option<TreeId>, TerminationReason> {
        let Some(state) = self.tree.node_mut(leaf).state.take() else {
            return Err(TerminationReason::FrontierInvariantViolation);
        };
        let g = self.tree.node(leaf).g;
        let problem = self.ctx.problem;
        self.tree.node_mut(leaf).expanded = true;
        self.stats.expanded += 1;

        let mut first = None;
        for succ in problem.all_successors(&state) {
            self.stats.generated += 1;
            let child = succ.state();
            if self.ctx.h(&child).is_infinite() {
                self.stats.dead_ends += 1;
                continue;
            }
            let cost = u64::from(succ.cost());
            let id = self
                .tree
                .add_child(leaf, child, succ.operator, g + cost)
                .map_err(|_| TerminationReason::AllocationFailure)?;
            first.get_or_insert(id);
        }
        Ok(first)
    }

    fn dead_end_score(&self, cost: u64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let fallback = -(cost as f64 + 1.0);
        self.score_range.map_or(fallback, |(lo, _)| lo.min(fallback))
    }

    /// Keep the trajectory through `target` if it beats the best so far.
    fn record_trajectory(&mut self, target: TreeId, result: &RolloutResult<P::Op>) -> bool {
        let total = self.tree.node(target).g + result.cost;
        if self.best.as_ref().is_some_and(|b| b.cost() <= total) {
            return false;
        }
        let mut operators: Vec<P::Op> = self
            .tree
            .path_from_root(target)
            .into_iter()
            .filter_map(|id| self.tree.node(id).operator.clone())
            .collect();
        operators.extend(result.operators.iter().cloned());
        self.best = Some(SolutionPlan::new(operators, total));
        true
    }

    fn backpropagate(&mut self, target: TreeId, score: f64, rollout_ops: &[P::Op]) {
        let path = self.tree.path_from_root(target);
        for &id in &path {
            let node = self.tree.node_mut(id);
            node.visits += 1;
            node.score_sum += score;
        }
        let tree = &self.tree;
        let tree_ops = path.iter().filter_map(|&id| tree.node(id).operator.as_ref());
        self.ctx.remember(tree_ops.chain(rollout_ops), score);
        self.score_range = Some(match self.score_range {
            Some((lo, hi)) => (lo.min(score), hi.max(score)),
            None => (score, score),
        });
    }

    /// Mark `id` finished and prune it, then walk up while the parent has
    /// lost its last child.
    fn finish(&mut self, mut id: TreeId) {
        loop {
            self.tree.node_mut(id).finished = true;
            let Some(parent) = self.tree.prune(id) else {
                return;
            };
            let p = self.tree.node(parent);
            if !(p.expanded && p.children.is_empty()) {
                return;
            }
            id = parent;
        }
    }

    /// Close the session into an outcome.
    #[must_use]
    pub fn into_outcome(mut self, termination: TerminationReason) -> SearchOutcome<P::Op> {
        let status = match termination {
            TerminationReason::PatienceExhausted { .. } | TerminationReason::RootExhausted => {
                if self.best.is_some() {
                    SearchStatus::SolutionFound
                } else {
                    SearchStatus::NoSolutionExist
                }
            }
            ref other => SearchStatus::from_termination(other),
        };
        self.stats.iterations = self.iterations;
        self.stats.stored_nodes = self.tree.len();
        self.stats.elapsed = self.budget.elapsed();
        self.stats.heuristics = vec![(
            Heuristic::<P::State>::name(self.ctx.heuristic).to_owned(),
            self.ctx.heuristic_stats.clone(),
        )];
        SearchOutcome {
            status,
            plan: self.best,
            stats: self.stats,
            termination,
            ida_bounds: Vec::new(),
            trace: self.trace,
        }
    }
}

/// Monte-Carlo tree search engine.
#[derive(Debug)]
pub struct MctsSolver<H> {
    heuristic: H,
    config: SearchConfig,
    rollouts: Vec<RolloutPolicy>,
    status: SearchStatus,
}

impl<H> MctsSolver<H> {
    /// Uses the standard rollout rotation: local search, random, tournament.
    #[must_use]
    pub fn new(heuristic: H, config: SearchConfig) -> Self {
        let rollouts = RolloutPolicy::standard(config.mcts.tournament_size);
        Self {
            heuristic,
            config,
            rollouts,
            status: SearchStatus::NotStarted,
        }
    }

    /// Replace the rollout rotation.
    #[must_use]
    pub fn with_rollouts(mut self, rollouts: Vec<RolloutPolicy>) -> Self {
        self.rollouts = rollouts;
        self
    }
}

impl<P, H> Planner<P> for MctsSolver<H>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    fn name(&self) -> &'static str {
        "mcts"
    }

    fn status(&self) -> SearchStatus {
        self.status
    }

    fn solve(&mut self, problem: &P) -> Result<SearchOutcome<P::Op>, SearchError> {
        let started = MctsSearch::new(problem, &self.heuristic, &self.config, &self.rollouts);
        let mut search = match started {
            Ok(search) => search,
            Err(err) => {
                self.status = SearchStatus::NotStarted;
                return Err(err);
            }
        };
        self.status = SearchStatus::InProgress;
        let termination = search.run();
        let outcome = search.into_outcome(termination);
        self.status = outcome.status;
        Ok(outcome)
    }
}
