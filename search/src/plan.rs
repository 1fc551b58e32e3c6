//! Solution plans: extraction from the node store, replay and digests.

use std::fmt;

use meridian_kernel::model::{Operator, Problem};
use meridian_kernel::proof::canon::{canonical_json_bytes, CanonError};
use meridian_kernel::proof::hash::{canonical_hash, ContentHash};
use meridian_kernel::proof::hash_domain::HashDomain;
use serde_json::{json, Value};

use crate::error::SearchError;
use crate::node::{NodeId, NodeStore};

/// An ordered operator sequence from the initial state to a goal.
///
/// Built once, never mutated. The textual form is `<op1, op2, ...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionPlan<O> {
    operators: Vec<O>,
    cost: u64,
}

impl<O> SolutionPlan<O> {
    /// Wrap `operators` whose costs sum to `cost`.
    #[must_use]
    pub fn new(operators: Vec<O>, cost: u64) -> Self {
        Self { operators, cost }
    }

    /// The plan for an initial state that already satisfies the goal.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    #[must_use]
    pub fn operators(&self) -> &[O] {
        &self.operators
    }

    /// Sum of operator costs.
    #[must_use]
    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// Number of operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl<O: fmt::Display> SolutionPlan<O> {
    /// Operator names in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.operators.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "cost": self.cost,
            "operator_count": self.operators.len(),
            "operators": self.names(),
        })
    }

    /// Domain-separated hash of the canonical JSON form.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`] from canonical serialization.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json())?;
        Ok(canonical_hash(HashDomain::SolutionPlan, &bytes))
    }
}

impl<O: fmt::Display> fmt::Display for SolutionPlan<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        for (i, op) in self.operators.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{op}")?;
        }
        f.write_str(">")
    }
}

impl<O> SolutionPlan<O> {
    /// Apply the plan from the problem's initial state.
    ///
    /// Each operator must be among the successors the problem enumerates for
    /// the current state (matched by order index), the final state must be a
    /// goal, and the summed cost must equal [`SolutionPlan::cost`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PlanReplay`] describing the first mismatch.
    pub fn replay<P>(&self, problem: &P) -> Result<u64, SearchError>
    where
        P: Problem<Op = O>,
        O: Operator<P::State>,
    {
        let mut state = problem.initial_state();
        let mut cost = 0u64;
        for (step, op) in self.operators.iter().enumerate() {
            let applicable = problem
                .all_successors(&state)
                .iter()
                .any(|s| s.operator.order_index() == op.order_index());
            if !applicable {
                return Err(SearchError::PlanReplay {
                    detail: format!("step {step}: operator `{op}` is not applicable"),
                });
            }
            state = op.apply(&state);
            cost += u64::from(op.cost());
        }
        if !problem.is_goal(&state) {
            return Err(SearchError::PlanReplay {
                detail: format!("final state after {} steps is not a goal", self.len()),
            });
        }
        if cost != self.cost {
            return Err(SearchError::PlanReplay {
                detail: format!("replayed cost {cost} differs from recorded cost {}", self.cost),
            });
        }
        Ok(cost)
    }
}

/// Rebuild the operator sequence leading to `goal`.
///
/// The store keeps only state predecessors. For each `(predecessor, state)`
/// pair the predecessor's successors are enumerated again and the first one
/// equal to `state` whose operator cost matches the recorded cost step is
/// taken. If no operator matches the cost step the first equal successor
/// wins. Enumeration order is therefore the tie-break between operators that
/// lead to equal states.
///
/// # Errors
///
/// Returns [`SearchError::BrokenPredecessorChain`] when the chain is cyclic or
/// a predecessor has no successor equal to the recorded state (the model's
/// successor generation is not deterministic).
pub fn extract_plan<P: Problem>(
    problem: &P,
    store: &NodeStore<P::State>,
    goal: NodeId,
) -> Result<SolutionPlan<P::Op>, SearchError> {
    let path = store
        .path_to(goal)
        .ok_or_else(|| SearchError::BrokenPredecessorChain {
            detail: "predecessor chain does not reach the initial state".into(),
        })?;

    let mut operators = Vec::with_capacity(path.len().saturating_sub(1));
    let mut cost = 0u64;
    for pair in path.windows(2) {
        let (pred, cur) = (pair[0], pair[1]);
        let origin = store.state(pred);
        let target = store.state(cur);
        let step = store.best_cost(cur).saturating_sub(store.best_cost(pred));

        let mut first_equal = None;
        let mut chosen = None;
        for succ in problem.all_successors(origin) {
            if succ.state() != *target {
                continue;
            }
            if u64::from(succ.cost()) == step {
                chosen = Some(succ.operator);
                break;
            }
            if first_equal.is_none() {
                first_equal = Some(succ.operator);
            }
        }
        let op = chosen.or(first_equal).ok_or_else(|| SearchError::BrokenPredecessorChain {
            detail: format!("no successor of {origin:?} reproduces {target:?}"),
        })?;
        cost += u64::from(op.cost());
        operators.push(op);
    }
    Ok(SolutionPlan::new(operators, cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_kernel::model::Successor;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Step {
        name: &'static str,
        delta: u32,
        cost: u32,
    }

    impl fmt::Display for Step {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name)
        }
    }

    impl Operator<u32> for Step {
        fn cost(&self) -> u32 {
            self.cost
        }

        fn order_index(&self) -> usize {
            self.name.len() * 100 + self.cost as usize
        }

        fn apply(&self, state: &u32) -> u32 {
            state + self.delta
        }
    }

    /// Counter from 0 to 3; "inc" and "bump" both add one, "bump" costs 5.
    struct Counter;

    impl Problem for Counter {
        type State = u32;
        type Op = Step;

        fn initial_state(&self) -> u32 {
            0
        }

        fn is_goal(&self, state: &u32) -> bool {
            *state == 3
        }

        fn all_successors<'s>(&self, state: &'s u32) -> Vec<Successor<'s, u32, Step>> {
            if *state >= 3 {
                return Vec::new();
            }
            vec![
                Successor::new(Step { name: "bump", delta: 1, cost: 5 }, state),
                Successor::new(Step { name: "inc", delta: 1, cost: 1 }, state),
            ]
        }

        fn all_predecessors(&self, _state: &u32) -> Vec<(Step, u32)> {
            Vec::new()
        }
    }

    fn chain(store: &mut NodeStore<u32>, costs: &[u64]) -> NodeId {
        let mut pred = None;
        let mut last = None;
        for (state, cost) in costs.iter().enumerate() {
            let (_, id) = store
                .try_update(&u32::try_from(state).unwrap(), *cost, pred)
                .unwrap();
            pred = Some(id);
            last = Some(id);
        }
        last.unwrap()
    }

    #[test]
    fn textual_form_lists_operator_names() {
        let plan = SolutionPlan::new(vec!["A->B", "B->C"], 2);
        assert_eq!(plan.to_string(), "<A->B, B->C>");
        assert_eq!(SolutionPlan::<&str>::empty().to_string(), "<>");
    }

    #[test]
    fn extraction_prefers_operator_matching_cost_step() {
        let mut store = NodeStore::new();
        let goal = chain(&mut store, &[0, 1, 2, 3]);
        let plan = extract_plan(&Counter, &store, goal).unwrap();
        assert_eq!(plan.to_string(), "<inc, inc, inc>");
        assert_eq!(plan.cost(), 3);
        assert_eq!(plan.replay(&Counter).unwrap(), 3);
    }

    #[test]
    fn extraction_falls_back_to_first_equal_successor() {
        let mut store = NodeStore::new();
        // A recorded step of 2 matches neither operator cost.
        let goal = chain(&mut store, &[0, 2, 4, 6]);
        let plan = extract_plan(&Counter, &store, goal).unwrap();
        assert_eq!(plan.to_string(), "<bump, bump, bump>");
        assert_eq!(plan.cost(), 15);
    }

    #[test]
    fn replay_rejects_wrong_cost_and_non_goal() {
        let inc = Step { name: "inc", delta: 1, cost: 1 };
        let short = SolutionPlan::new(vec![inc.clone(), inc.clone()], 2);
        assert!(matches!(
            short.replay(&Counter),
            Err(SearchError::PlanReplay { .. })
        ));

        let lying = SolutionPlan::new(vec![inc.clone(), inc.clone(), inc], 7);
        let err = lying.replay(&Counter).unwrap_err();
        assert!(err.to_string().contains("differs"));
    }

    #[test]
    fn replay_rejects_inapplicable_operator() {
        let leap = Step { name: "leap", delta: 3, cost: 1 };
        let plan = SolutionPlan::new(vec![leap], 1);
        let err = plan.replay(&Counter).unwrap_err();
        assert!(err.to_string().contains("not applicable"));
    }

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        let a = SolutionPlan::new(vec!["x", "y"], 2);
        let b = SolutionPlan::new(vec!["x", "y"], 2);
        let c = SolutionPlan::new(vec!["y", "x"], 2);
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_ne!(a.digest().unwrap(), c.digest().unwrap());
        assert!(a.digest().unwrap().as_str().starts_with("sha256:"));
    }
}
