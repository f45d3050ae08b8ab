//! One-step lookahead shared by the model-based solvers

use super::Space;
use crate::mdp::{MarkovModel, Policy, QTable, ValueTable, tables::first_max};

/// Σ p·(r + γ·V(s')) for one (state, action) pair.
///
/// Next states outside the enumeration contribute V(s') = 0.
pub(crate) fn expected_return<M: MarkovModel>(
    model: &M,
    space: &Space<M>,
    values: &ValueTable,
    discount: f64,
    state: &M::State,
    action: &M::Action,
) -> f64 {
    model
        .transitions(state, action)
        .iter()
        .map(|t| t.probability * (t.reward + discount * values.value_of(space, &t.next_state)))
        .sum()
}

/// Expected return of every legal action of the state at `idx`, in action
/// order. Empty for terminal states, which are never expanded.
pub(crate) fn action_values<M: MarkovModel>(
    model: &M,
    space: &Space<M>,
    values: &ValueTable,
    discount: f64,
    idx: usize,
) -> Vec<f64> {
    if space.is_terminal(idx) {
        return Vec::new();
    }
    let state = space.state(idx);
    space
        .actions(idx)
        .iter()
        .map(|action| expected_return(model, space, values, discount, state, action))
        .collect()
}

/// Best action index and its expected return; the first maximum wins ties.
pub(crate) fn greedy<M: MarkovModel>(
    model: &M,
    space: &Space<M>,
    values: &ValueTable,
    discount: f64,
    idx: usize,
) -> Option<(usize, f64)> {
    first_max(&action_values(model, space, values, discount, idx))
}

/// Greedy policy with respect to `values`. Terminal states get no entry.
pub(crate) fn extract_policy<M: MarkovModel>(
    model: &M,
    space: &Space<M>,
    values: &ValueTable,
    discount: f64,
) -> Policy<M::State, M::Action> {
    let mut policy = Policy::with_capacity(space.len());
    for idx in space.decision_indices() {
        if let Some((action_idx, _)) = greedy(model, space, values, discount, idx) {
            policy.set(
                space.state(idx).clone(),
                space.actions(idx)[action_idx].clone(),
            );
        }
    }
    policy
}

/// Arg-max policy of a Q-table. Terminal states get no entry.
pub(crate) fn q_policy<M: MarkovModel>(space: &Space<M>, q: &QTable) -> Policy<M::State, M::Action> {
    let mut policy = Policy::with_capacity(space.len());
    for idx in space.decision_indices() {
        if let Some(action_idx) = q.greedy_action(idx) {
            policy.set(
                space.state(idx).clone(),
                space.actions(idx)[action_idx].clone(),
            );
        }
    }
    policy
}
