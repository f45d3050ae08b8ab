//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
};

use ttt_mdp::mdp::{MarkovModel, TabularMdp, Transition};

pub const GOAL: usize = 3;
pub const PIT: usize = 4;

/// Slippery three-step walk to a goal, with risky shortcuts.
///
/// Optimal under γ = 0.9: walk (0) in states 0 and 2, gamble (1) in state 1,
/// with V* = [5.804878..., 8.0, 9.780219...].
pub fn slippery_walk() -> TabularMdp {
    TabularMdp::builder(5)
        .transition(0, 0, 0.8, -1.0, 1)
        .transition(0, 0, 0.2, -1.0, 0)
        .transition(0, 1, 0.5, -1.0, 2)
        .transition(0, 1, 0.5, -10.0, PIT)
        .transition(1, 0, 0.8, -1.0, 2)
        .transition(1, 0, 0.2, -1.0, 1)
        .transition(1, 1, 0.9, 10.0, GOAL)
        .transition(1, 1, 0.1, -10.0, PIT)
        .transition(2, 0, 0.9, 10.0, GOAL)
        .transition(2, 0, 0.1, -1.0, 2)
        .transition(2, 1, 1.0, 0.0, 0)
        .terminal(GOAL)
        .terminal(PIT)
        .build()
        .expect("valid slippery walk")
}

pub const SLIPPERY_OPTIMAL_VALUES: [f64; 3] = [5.804878048780489, 8.0, 9.780219780219781];
pub const SLIPPERY_OPTIMAL_ACTIONS: [usize; 3] = [0, 1, 0];

/// Deterministic corridor `0 -> 1 -> 2 -> 3 -> goal(4)`.
///
/// Action 0 steps forward (reward -1, +10 into the goal), action 1 steps
/// back (reward 0, state 0 stays put). Forward is optimal everywhere.
pub fn corridor() -> TabularMdp {
    TabularMdp::builder(5)
        .transition(0, 0, 1.0, -1.0, 1)
        .transition(0, 1, 1.0, 0.0, 0)
        .transition(1, 0, 1.0, -1.0, 2)
        .transition(1, 1, 1.0, 0.0, 0)
        .transition(2, 0, 1.0, -1.0, 3)
        .transition(2, 1, 1.0, 0.0, 1)
        .transition(3, 0, 1.0, 10.0, 4)
        .transition(3, 1, 1.0, 0.0, 2)
        .terminal(4)
        .start(0)
        .build()
        .expect("valid corridor")
}

/// Wraps a model and records how the solvers query it.
///
/// Requesting transitions or actions for a terminal state panics.
#[derive(Debug)]
pub struct AuditedModel<M: MarkovModel> {
    inner: M,
    pub transition_calls: Cell<usize>,
    pub action_queries: RefCell<Vec<M::State>>,
}

impl<M: MarkovModel> AuditedModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            transition_calls: Cell::new(0),
            action_queries: RefCell::new(Vec::new()),
        }
    }

    /// Whether `legal_actions` was asked about each state at most once.
    pub fn actions_queried_once(&self) -> bool {
        let queries = self.action_queries.borrow();
        let distinct: HashSet<_> = queries.iter().collect();
        distinct.len() == queries.len()
    }
}

impl<M: MarkovModel> MarkovModel for AuditedModel<M> {
    type State = M::State;
    type Action = M::Action;

    fn enumerate_states(&self) -> Vec<Self::State> {
        self.inner.enumerate_states()
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        assert!(
            !self.inner.is_terminal(state),
            "legal actions requested for terminal state {state:?}"
        );
        self.action_queries.borrow_mut().push(state.clone());
        self.inner.legal_actions(state)
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        self.inner.is_terminal(state)
    }

    fn transitions(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Vec<Transition<Self::State>> {
        assert!(
            !self.inner.is_terminal(state),
            "transitions requested for terminal state {state:?}"
        );
        self.transition_calls.set(self.transition_calls.get() + 1);
        self.inner.transitions(state, action)
    }
}
