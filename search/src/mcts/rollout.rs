//! Simulation policies and the per-solver context they draw on.

use std::collections::HashMap;

use meridian_kernel::model::{Heuristic, HeuristicStats, Operator, Problem};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::budget::Budget;

/// Everything selection, expansion and simulation need besides the tree.
///
/// Owned by one solver run; nothing here is shared between runs.
pub struct MctsContext<'p, P, H> {
    pub problem: &'p P,
    pub heuristic: &'p H,
    pub rng: ChaCha8Rng,
    /// Score sum and count per operator order index.
    pub history: HashMap<usize, (f64, u64)>,
    pub heuristic_stats: HeuristicStats,
}

impl<'p, P, H> MctsContext<'p, P, H>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    pub fn new(problem: &'p P, heuristic: &'p H, rng: ChaCha8Rng) -> Self {
        Self {
            problem,
            heuristic,
            rng,
            history: HashMap::new(),
            heuristic_stats: HeuristicStats::new(),
        }
    }

    /// Evaluate the heuristic and record the value.
    pub fn h(&mut self, state: &P::State) -> f64 {
        let h = self.heuristic.value(state);
        self.heuristic_stats.record(h);
        h
    }

    /// Record `score` against every operator in `ops`.
    pub fn remember<'o>(&mut self, ops: impl IntoIterator<Item = &'o P::Op>, score: f64)
    where
        P::Op: 'o,
    {
        for op in ops {
            let entry = self.history.entry(op.order_index()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }

    /// Mean historical score of an operator, `None` if never used.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_outcome(&self, op: &P::Op) -> Option<f64> {
        self.history
            .get(&op.order_index())
            .filter(|(_, n)| *n > 0)
            .map(|(sum, n)| sum / *n as f64)
    }
}

/// How a rollout picks the next operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutPolicy {
    /// Greedy descent on `h`, random among equally good successors. Takes a
    /// uniform random step when no successor improves on the current `h`.
    LocalSearch,
    /// Uniform random successor.
    Random,
    /// Sample `k` successors, keep the one whose operator has the best
    /// historical mean outcome. Unseen operators win.
    Tournament { size: usize },
}

impl RolloutPolicy {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::LocalSearch => "local_search",
            Self::Random => "random",
            Self::Tournament { .. } => "tournament",
        }
    }

    /// The default rotation.
    #[must_use]
    pub fn standard(tournament_size: usize) -> Vec<Self> {
        vec![
            Self::LocalSearch,
            Self::Random,
            Self::Tournament {
                size: tournament_size,
            },
        ]
    }
}

/// How a rollout ended.
#[derive(Debug, Clone)]
pub struct RolloutResult<O> {
    pub operators: Vec<O>,
    /// Cost of the rollout operators alone.
    pub cost: u64,
    pub reached_goal: bool,
    /// No applicable operator, or the heuristic proved a dead end.
    pub dead_end: bool,
    /// Heuristic value of the final state (`0` at a goal).
    pub h_end: f64,
    pub timed_out: bool,
}

/// Simulate from `start` for at most `max_steps` operator applications.
pub fn rollout<P, H>(
    ctx: &mut MctsContext<'_, P, H>,
    policy: RolloutPolicy,
    start: &P::State,
    max_steps: usize,
    budget: &Budget,
) -> RolloutResult<P::Op>
where
    P: Problem,
    H: Heuristic<P::State>,
{
    let mut state = start.clone();
    let mut result = RolloutResult {
        operators: Vec::new(),
        cost: 0,
        reached_goal: false,
        dead_end: false,
        h_end: 0.0,
        timed_out: false,
    };
    let mut h_now = ctx.h(&state);

    for _ in 0..max_steps {
        if ctx.problem.is_goal(&state) {
            result.reached_goal = true;
            result.h_end = 0.0;
            return result;
        }
        if h_now.is_infinite() {
            result.dead_end = true;
            result.h_end = h_now;
            return result;
        }
        if budget.time_exceeded() {
            result.timed_out = true;
            break;
        }

        let successors = ctx.problem.all_successors(&state);
        if successors.is_empty() {
            result.dead_end = true;
            result.h_end = h_now;
            return result;
        }
        let ops: Vec<P::Op> = successors.into_iter().map(|s| s.operator).collect();
        let (op, next, h_next) = match policy {
            RolloutPolicy::LocalSearch => local_step(ctx, &state, &ops, h_now),
            RolloutPolicy::Random => {
                let idx = ctx.rng.gen_range(0..ops.len());
                let next = ops[idx].apply(&state);
                let h = ctx.h(&next);
                (ops[idx].clone(), next, h)
            }
            RolloutPolicy::Tournament { size } => {
                let idx = tournament_pick(ctx, &ops, size);
                let next = ops[idx].apply(&state);
                let h = ctx.h(&next);
                (ops[idx].clone(), next, h)
            }
        };
        result.cost += u64::from(op.cost());
        result.operators.push(op);
        state = next;
        h_now = h_next;
    }

    result.reached_goal = ctx.problem.is_goal(&state);
    result.h_end = if result.reached_goal { 0.0 } else { h_now };
    result.dead_end = !result.reached_goal && h_now.is_infinite();
    result
}

fn local_step<P, H>(
    ctx: &mut MctsContext<'_, P, H>,
    state: &P::State,
    ops: &[P::Op],
    h_now: f64,
) -> (P::Op, P::State, f64)
where
    P: Problem,
    H: Heuristic<P::State>,
{
    let mut scored: Vec<(usize, P::State, f64)> = ops
        .iter()
        .enumerate()
        .map(|(i, op)| {
            let next = op.apply(state);
            let h = ctx.h(&next);
            (i, next, h)
        })
        .collect();
    let best_h = scored
        .iter()
        .map(|(_, _, h)| *h)
        .fold(f64::INFINITY, f64::min);

    let pick = if best_h < h_now {
        let ties: Vec<usize> = scored
            .iter()
            .enumerate()
            .filter(|(_, (_, _, h))| *h == best_h)
            .map(|(pos, _)| pos)
            .collect();
        ties.choose(&mut ctx.rng).copied().unwrap_or(0)
    } else {
        ctx.rng.gen_range(0..scored.len())
    };
    let (i, next, h) = scored.swap_remove(pick);
    (ops[i].clone(), next, h)
}

fn tournament_pick<P, H>(ctx: &mut MctsContext<'_, P, H>, ops: &[P::Op], size: usize) -> usize
where
    P: Problem,
    H: Heuristic<P::State>,
{
    let mut best: Option<(usize, f64)> = None;
    for _ in 0..size.max(1) {
        let idx = ctx.rng.gen_range(0..ops.len());
        let value = ctx.mean_outcome(&ops[idx]).unwrap_or(f64::INFINITY);
        match best {
            Some((_, v)) if value <= v => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map_or(0, |(idx, _)| idx)
}
