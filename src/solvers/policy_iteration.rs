//! Policy iteration
//!
//! Two nested loops with two different stopping conditions:
//!
//! 1. **Evaluation** iterates the Bellman expectation equation for the
//!    current policy until no state value moves by more than δ.
//! 2. **Improvement** makes the policy greedy with respect to those values.
//!
//! Training alternates the two until improvement leaves the policy
//! unchanged. Both loops are capped; hitting a cap is logged and reported,
//! never turned into an endless loop.

use rand::{Rng, rngs::StdRng};

use super::{Solver, SolverKind, Space, TrainingMetadata, build_rng, lookahead};
use crate::{
    Result,
    config::PolicyIterationConfig,
    mdp::{MarkovModel, Policy, StateSpace, ValueTable},
};

/// Result of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationReport {
    /// Sweeps performed
    pub sweeps: usize,
    /// Largest per-state change of the last sweep
    pub max_change: f64,
    /// Whether the change dropped to δ or below before the sweep cap
    pub converged: bool,
}

/// Policy-iteration solver.
#[derive(Debug, Clone)]
pub struct PolicyIteration<M: MarkovModel> {
    model: M,
    space: Space<M>,
    values: ValueTable,
    /// Current action index per state; `None` for terminal states
    actions: Vec<Option<usize>>,
    config: PolicyIterationConfig,
    rng: StdRng,
    rounds: usize,
    stable: bool,
    policy: Option<Policy<M::State, M::Action>>,
}

impl<M: MarkovModel> PolicyIteration<M> {
    /// Enumerate the model, zero the values and draw a random initial policy.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or a non-terminal state with no actions.
    pub fn new(model: M, config: PolicyIterationConfig) -> Result<Self> {
        config.validate()?;
        let space = StateSpace::build(&model)?;
        let mut solver = Self {
            values: ValueTable::zeros(space.len()),
            actions: vec![None; space.len()],
            rng: build_rng(config.seed),
            model,
            space,
            config,
            rounds: 0,
            stable: false,
            policy: None,
        };
        solver.init_random_policy();
        Ok(solver)
    }

    /// Construct and train in one step.
    pub fn solve(model: M, config: PolicyIterationConfig) -> Result<Self> {
        let mut solver = Self::new(model, config)?;
        solver.train()?;
        Ok(solver)
    }

    /// Pick a legal action uniformly at random for every non-terminal state.
    pub fn init_random_policy(&mut self) {
        for idx in 0..self.space.len() {
            let n = self.space.actions(idx).len();
            self.actions[idx] = if n == 0 {
                None
            } else {
                Some(self.rng.random_range(0..n))
            };
        }
    }

    /// V(s) under the current policy for the state at `idx`, from `values`.
    fn policy_value(&self, values: &ValueTable, idx: usize) -> Option<f64> {
        let action_idx = self.actions[idx]?;
        Some(lookahead::expected_return(
            &self.model,
            &self.space,
            values,
            self.config.discount,
            self.space.state(idx),
            &self.space.actions(idx)[action_idx],
        ))
    }

    /// Iterate the Bellman expectation equation for the current policy.
    ///
    /// Sweeps are synchronous. States without a policy action keep their
    /// value. Stops once the largest change of a sweep is at most `delta`,
    /// or after `max_evaluation_sweeps` sweeps with a warning.
    pub fn evaluate_policy(&mut self, delta: f64) -> EvaluationReport {
        let cap = self.config.max_evaluation_sweeps;
        let mut max_change = 0.0;

        for sweep in 1..=cap {
            let mut next = self.values.clone();
            for idx in 0..self.space.len() {
                if let Some(value) = self.policy_value(&self.values, idx) {
                    next.set(idx, value);
                }
            }
            max_change = next.max_difference(&self.values);
            self.values = next;

            if max_change <= delta {
                log::debug!("policy evaluation converged after {sweep} sweeps ({max_change:.6})");
                return EvaluationReport {
                    sweeps: sweep,
                    max_change,
                    converged: true,
                };
            }
        }

        log::warn!(
            "policy evaluation did not converge within {cap} sweeps (last change {max_change:.6} > {delta})"
        );
        EvaluationReport {
            sweeps: cap,
            max_change,
            converged: false,
        }
    }

    /// Make the policy greedy with respect to the current values.
    ///
    /// Values are read from a fixed table for the whole scan. Ties go to the
    /// first action in enumeration order. Returns whether any state changed
    /// its action.
    pub fn improve_policy(&mut self) -> bool {
        let mut changed = false;
        for idx in self.space.decision_indices() {
            let best = lookahead::greedy(
                &self.model,
                &self.space,
                &self.values,
                self.config.discount,
                idx,
            )
            .map(|(action_idx, _)| action_idx);

            if best.is_some() && best != self.actions[idx] {
                self.actions[idx] = best;
                changed = true;
            }
        }
        changed
    }

    /// Materialize the internal action map as a [`Policy`].
    fn export_policy(&self) -> Policy<M::State, M::Action> {
        self.actions
            .iter()
            .enumerate()
            .filter_map(|(idx, action)| {
                let action_idx = (*action)?;
                Some((
                    self.space.state(idx).clone(),
                    self.space.actions(idx)[action_idx].clone(),
                ))
            })
            .collect()
    }

    /// Action the current (possibly unfinished) policy takes in `state`.
    pub fn current_action(&self, state: &M::State) -> Option<&M::Action> {
        let idx = self.space.index_of(state)?;
        let action_idx = self.actions[idx]?;
        Some(&self.space.actions(idx)[action_idx])
    }

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    /// V(state) under the current policy, 0 outside the enumeration.
    pub fn value_of(&self, state: &M::State) -> f64 {
        self.values.value_of(&self.space, state)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &PolicyIterationConfig {
        &self.config
    }
}

impl<M: MarkovModel> Solver for PolicyIteration<M> {
    type State = M::State;
    type Action = M::Action;

    fn train(&mut self) -> Result<&Policy<M::State, M::Action>> {
        log::info!(
            "policy iteration: {} states, discount {}, delta {}",
            self.space.len(),
            self.config.discount,
            self.config.delta
        );
        self.policy = None;
        self.stable = false;

        for round in 1..=self.config.max_improvements {
            let report = self.evaluate_policy(self.config.delta);
            let changed = self.improve_policy();
            self.rounds += 1;
            log::debug!(
                "policy iteration round {round}: {} sweeps, policy changed: {changed}",
                report.sweeps
            );
            if !changed {
                self.stable = true;
                break;
            }
        }

        if !self.stable {
            log::warn!(
                "policy still changing after {} improvement rounds",
                self.config.max_improvements
            );
        }

        let exported = self.export_policy();
        let policy = self.policy.insert(exported);
        log::info!(
            "policy iteration finished after {} rounds, {} policy entries",
            self.rounds,
            policy.len()
        );
        Ok(&*policy)
    }

    fn policy(&self) -> Option<&Policy<M::State, M::Action>> {
        self.policy.as_ref()
    }

    fn kind(&self) -> SolverKind {
        SolverKind::PolicyIteration
    }

    fn space(&self) -> &Space<M> {
        &self.space
    }

    fn metadata(&self) -> TrainingMetadata {
        TrainingMetadata {
            states: self.space.len(),
            iterations: self.rounds,
            converged: self.stable,
            seed: self.config.seed,
        }
    }
}
