//! Markov decision process contracts shared by every solver
//!
//! A solver never looks inside a state or an action. It only needs:
//!
//! - a [`MarkovModel`] that enumerates the reachable states, lists legal
//!   actions, flags terminal states and produces transition distributions;
//! - for model-free learning, an [`Environment`] that can be stepped one
//!   action at a time.
//!
//! The tables the solvers mutate ([`ValueTable`], [`QTable`]) are dense
//! arrays indexed through a [`StateSpace`] built once from the enumeration.

pub mod policy;
pub mod space;
pub mod tables;
pub mod tabular;

use std::{fmt::Debug, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub use policy::Policy;
pub use space::StateSpace;
pub use tables::{QTable, ValueTable};
pub use tabular::{TabularEnvironment, TabularMdp};

/// Tolerance for the sum of a transition distribution.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// One possible result of taking an action in a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition<S> {
    pub probability: f64,
    pub reward: f64,
    pub next_state: S,
}

impl<S> Transition<S> {
    pub fn new(probability: f64, reward: f64, next_state: S) -> Self {
        Self {
            probability,
            reward,
            next_state,
        }
    }
}

/// Environment model: states, legal actions and transition distributions.
///
/// The starting condition (e.g. which player moves first) is part of the
/// model value, so [`MarkovModel::enumerate_states`] takes no arguments.
pub trait MarkovModel {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Eq + Debug;

    /// Every state reachable under the model's starting condition,
    /// terminal states included, in a deterministic order.
    fn enumerate_states(&self) -> Vec<Self::State>;

    /// Legal actions in enumeration order. Empty for terminal states.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Transition distribution for a legal action in a non-terminal state.
    ///
    /// Callers must not ask for terminal states or for actions missing from
    /// [`MarkovModel::legal_actions`].
    fn transitions(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Vec<Transition<Self::State>>;
}

/// The observed result of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<S, A> {
    pub state: S,
    pub action: A,
    pub reward: f64,
    pub next_state: S,
}

/// Live episode simulator used by model-free learning.
pub trait Environment {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Eq + Debug;

    /// Start a new episode.
    fn reset(&mut self);

    fn is_terminal(&self) -> bool;

    fn current_state(&self) -> Self::State;

    /// Apply an action to the current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalAction`] if the action is not legal in the
    /// current state. The environment is left unchanged in that case.
    fn step(&mut self, action: &Self::Action) -> Result<Outcome<Self::State, Self::Action>>;
}

/// Check that every distribution the model produces is a probability
/// distribution.
///
/// Only non-terminal enumerated states and their legal actions are queried.
pub fn validate_transitions<M: MarkovModel>(model: &M) -> Result<()> {
    for state in model.enumerate_states() {
        if model.is_terminal(&state) {
            continue;
        }
        for action in model.legal_actions(&state) {
            let transitions = model.transitions(&state, &action);
            let invalid = |reason: String| Error::InvalidTransitionProbabilities {
                state: format!("{state:?}"),
                action: format!("{action:?}"),
                reason,
            };

            if transitions.is_empty() {
                return Err(invalid("no transitions".to_string()));
            }
            if let Some(t) = transitions
                .iter()
                .find(|t| !(t.probability > 0.0 && t.probability <= 1.0))
            {
                return Err(invalid(format!(
                    "probability {} outside (0, 1]",
                    t.probability
                )));
            }
            let total: f64 = transitions.iter().map(|t| t.probability).sum();
            if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
                return Err(invalid(format!("probabilities sum to {total}")));
            }
        }
    }
    Ok(())
}
