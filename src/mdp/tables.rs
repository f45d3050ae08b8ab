//! Value and action-value tables indexed by a [`StateSpace`]
//!
//! Lookups of states or pairs outside the enumeration return 0. States that
//! only appear as transition targets are therefore valued at 0 rather than
//! treated as an error.

use std::{fmt::Debug, hash::Hash};

use super::StateSpace;
use crate::{Error, Result};

/// State values V(s), one entry per enumerated state.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    values: Vec<f64>,
}

impl ValueTable {
    /// All-zero table for a space of `len` states.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub fn get(&self, idx: usize) -> f64 {
        self.values[idx]
    }

    pub fn set(&mut self, idx: usize, value: f64) {
        self.values[idx] = value;
    }

    /// Value of `state`, or 0 if it was never enumerated.
    pub fn value_of<S, A>(&self, space: &StateSpace<S, A>, state: &S) -> f64
    where
        S: Clone + Eq + Hash + Debug,
        A: Clone + Eq + Debug,
    {
        space.index_of(state).map_or(0.0, |idx| self.values[idx])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest absolute per-state difference between two tables.
    pub fn max_difference(&self, other: &ValueTable) -> f64 {
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

/// Action values Q(s, a).
///
/// Each enumerated state owns a row aligned with its cached legal actions,
/// so terminal states have empty rows.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    rows: Vec<Vec<f64>>,
}

impl QTable {
    /// All-zero table covering every (state, action) pair of `space`.
    pub fn zeros<S, A>(space: &StateSpace<S, A>) -> Self
    where
        S: Clone + Eq + Hash + Debug,
        A: Clone + Eq + Debug,
    {
        Self {
            rows: (0..space.len())
                .map(|idx| vec![0.0; space.actions(idx).len()])
                .collect(),
        }
    }

    /// Row of action values for the state at `idx`.
    pub fn row(&self, idx: usize) -> &[f64] {
        &self.rows[idx]
    }

    pub fn get(&self, idx: usize, action_idx: usize) -> f64 {
        self.rows[idx][action_idx]
    }

    pub fn set(&mut self, idx: usize, action_idx: usize, value: f64) {
        self.rows[idx][action_idx] = value;
    }

    /// Q(state, action), or 0 for a pair outside the table.
    pub fn value_of<S, A>(&self, space: &StateSpace<S, A>, state: &S, action: &A) -> f64
    where
        S: Clone + Eq + Hash + Debug,
        A: Clone + Eq + Debug,
    {
        space
            .index_of(state)
            .and_then(|idx| Some(self.rows[idx][space.action_index(idx, action)?]))
            .unwrap_or(0.0)
    }

    /// Overwrite Q(state, action).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStateAction`] if the pair was never enumerated.
    pub fn set_value<S, A>(
        &mut self,
        space: &StateSpace<S, A>,
        state: &S,
        action: &A,
        value: f64,
    ) -> Result<()>
    where
        S: Clone + Eq + Hash + Debug,
        A: Clone + Eq + Debug,
    {
        let (idx, action_idx) = space
            .index_of(state)
            .and_then(|idx| Some((idx, space.action_index(idx, action)?)))
            .ok_or_else(|| Error::UnknownStateAction {
                state: format!("{state:?}"),
                action: format!("{action:?}"),
            })?;
        self.rows[idx][action_idx] = value;
        Ok(())
    }

    /// max_a Q(s, a) for the state at `idx`; 0 when it has no actions.
    pub fn max_q(&self, idx: usize) -> f64 {
        let row = &self.rows[idx];
        if row.is_empty() {
            0.0
        } else {
            row.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
    }

    /// Index of the first action with the highest value, if any.
    pub fn greedy_action(&self, idx: usize) -> Option<usize> {
        first_max(&self.rows[idx]).map(|(action_idx, _)| action_idx)
    }

    /// Number of (state, action) entries.
    pub fn size(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Position and value of the first maximum. Later equal values never win.
pub(crate) fn first_max(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}
