//! Solver output: a mapping from states to actions

use std::{collections::HashMap, hash::Hash};

/// Deterministic policy produced by a solver.
///
/// Each solver builds its own instance once training completes. Terminal
/// states never receive an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy<S, A>
where
    S: Eq + Hash,
{
    actions: HashMap<S, A>,
}

impl<S, A> Policy<S, A>
where
    S: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            actions: HashMap::with_capacity(capacity),
        }
    }

    pub fn set(&mut self, state: S, action: A) {
        self.actions.insert(state, action);
    }

    pub fn get(&self, state: &S) -> Option<&A> {
        self.actions.get(state)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.actions.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &A)> {
        self.actions.iter()
    }
}

impl<S, A> Default for Policy<S, A>
where
    S: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> FromIterator<(S, A)> for Policy<S, A>
where
    S: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (S, A)>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}
