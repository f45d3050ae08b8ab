//! Value iteration with a fixed sweep count
//!
//! Each sweep applies the Bellman optimality update
//!
//! V'(s) = max_a Σ p·(r + γ·V(s'))
//!
//! to every non-terminal state, reading only the previous sweep's table
//! (synchronous update), so the result does not depend on the order in which
//! states are visited. Terminal states are pinned to 0.

use super::{Solver, SolverKind, Space, TrainingMetadata, lookahead};
use crate::{
    Result,
    config::ValueIterationConfig,
    mdp::{MarkovModel, Policy, StateSpace, ValueTable},
};

/// Value-iteration solver.
#[derive(Debug, Clone)]
pub struct ValueIteration<M: MarkovModel> {
    model: M,
    space: Space<M>,
    values: ValueTable,
    config: ValueIterationConfig,
    sweeps: usize,
    last_change: f64,
    policy: Option<Policy<M::State, M::Action>>,
}

impl<M: MarkovModel> ValueIteration<M> {
    /// Enumerate the model and set every state value to 0.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or a non-terminal state with no actions.
    pub fn new(model: M, config: ValueIterationConfig) -> Result<Self> {
        config.validate()?;
        let space = StateSpace::build(&model)?;
        let values = ValueTable::zeros(space.len());
        Ok(Self {
            model,
            space,
            values,
            config,
            sweeps: 0,
            last_change: 0.0,
            policy: None,
        })
    }

    /// Construct and train in one step.
    pub fn solve(model: M, config: ValueIterationConfig) -> Result<Self> {
        let mut solver = Self::new(model, config)?;
        solver.train()?;
        Ok(solver)
    }

    /// One synchronous Bellman-optimality sweep over the current table.
    fn sweep(&self) -> ValueTable {
        let mut next = ValueTable::zeros(self.space.len());
        for idx in self.space.decision_indices() {
            let best = lookahead::greedy(
                &self.model,
                &self.space,
                &self.values,
                self.config.discount,
                idx,
            )
            .map_or(0.0, |(_, value)| value);
            next.set(idx, best);
        }
        next
    }

    /// Perform exactly `config.iterations` sweeps.
    ///
    /// Returns the largest per-state change made by the final sweep.
    pub fn iterate(&mut self) -> f64 {
        let mut change = 0.0;
        for sweep in 1..=self.config.iterations {
            let next = self.sweep();
            change = next.max_difference(&self.values);
            self.values = next;
            self.sweeps += 1;
            log::debug!("value iteration sweep {sweep}: max change {change:.6}");
        }
        self.last_change = change;
        change
    }

    /// Greedy one-step lookahead against the current table.
    pub fn extract_policy(&self) -> Policy<M::State, M::Action> {
        lookahead::extract_policy(&self.model, &self.space, &self.values, self.config.discount)
    }

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    /// V(state), 0 for states outside the enumeration.
    pub fn value_of(&self, state: &M::State) -> f64 {
        self.values.value_of(&self.space, state)
    }

    /// Largest per-state change of the most recent sweep.
    pub fn last_change(&self) -> f64 {
        self.last_change
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &ValueIterationConfig {
        &self.config
    }
}

impl<M: MarkovModel> Solver for ValueIteration<M> {
    type State = M::State;
    type Action = M::Action;

    fn train(&mut self) -> Result<&Policy<M::State, M::Action>> {
        log::info!(
            "value iteration: {} states, {} sweeps, discount {}",
            self.space.len(),
            self.config.iterations,
            self.config.discount
        );
        self.policy = None;
        let change = self.iterate();
        let extracted = self.extract_policy();
        let policy = self.policy.insert(extracted);
        log::info!(
            "value iteration finished: final change {change:.6}, {} policy entries",
            policy.len()
        );
        Ok(&*policy)
    }

    fn policy(&self) -> Option<&Policy<M::State, M::Action>> {
        self.policy.as_ref()
    }

    fn kind(&self) -> SolverKind {
        SolverKind::ValueIteration
    }

    fn space(&self) -> &Space<M> {
        &self.space
    }

    fn metadata(&self) -> TrainingMetadata {
        TrainingMetadata {
            states: self.space.len(),
            iterations: self.sweeps,
            converged: self.policy.is_some(),
            seed: None,
        }
    }
}
