//! Dense indexing of an enumerated state space

use std::collections::HashMap;

use super::MarkovModel;
use crate::{Error, Result};

/// Enumerated states with a dense index per state.
///
/// Built once from [`MarkovModel::enumerate_states`]. Legal actions and
/// terminal flags are cached per index, so the model is consulted once per
/// state no matter how many sweeps a solver performs.
#[derive(Debug, Clone)]
pub struct StateSpace<S, A> {
    states: Vec<S>,
    index: HashMap<S, usize>,
    actions: Vec<Vec<A>>,
    terminal: Vec<bool>,
}

impl<S, A> StateSpace<S, A>
where
    S: Clone + Eq + std::hash::Hash + std::fmt::Debug,
    A: Clone + Eq + std::fmt::Debug,
{
    /// Enumerate the model's states and assign indices in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActionsAvailable`] if a non-terminal state has no
    /// legal actions.
    pub fn build<M>(model: &M) -> Result<Self>
    where
        M: MarkovModel<State = S, Action = A>,
    {
        let mut space = Self {
            states: Vec::new(),
            index: HashMap::new(),
            actions: Vec::new(),
            terminal: Vec::new(),
        };

        for state in model.enumerate_states() {
            if space.index.contains_key(&state) {
                continue;
            }
            let terminal = model.is_terminal(&state);
            let actions = if terminal {
                Vec::new()
            } else {
                model.legal_actions(&state)
            };
            if !terminal && actions.is_empty() {
                return Err(Error::NoActionsAvailable {
                    state: format!("{state:?}"),
                });
            }

            space.index.insert(state.clone(), space.states.len());
            space.states.push(state);
            space.actions.push(actions);
            space.terminal.push(terminal);
        }

        Ok(space)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Dense index of a state, if it was enumerated.
    pub fn index_of(&self, state: &S) -> Option<usize> {
        self.index.get(state).copied()
    }

    pub fn state(&self, idx: usize) -> &S {
        &self.states[idx]
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Cached legal actions of the state at `idx`. Empty for terminal states.
    pub fn actions(&self, idx: usize) -> &[A] {
        &self.actions[idx]
    }

    pub fn is_terminal(&self, idx: usize) -> bool {
        self.terminal[idx]
    }

    /// Position of `action` within the legal actions of the state at `idx`.
    pub fn action_index(&self, idx: usize, action: &A) -> Option<usize> {
        self.actions[idx].iter().position(|a| a == action)
    }

    /// Indices of every non-terminal state, in enumeration order.
    pub fn decision_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.states.len()).filter(|&idx| !self.terminal[idx])
    }

    /// Total number of (state, action) pairs.
    pub fn pair_count(&self) -> usize {
        self.actions.iter().map(Vec::len).sum()
    }
}
