//! MDP solvers
//!
//! Three classical ways to turn an environment into a [`Policy`]:
//!
//! | Solver | Needs | Stops after |
//! |--------|-------|-------------|
//! | [`ValueIteration`] | transition model | exactly k sweeps |
//! | [`PolicyIteration`] | transition model | a stable policy |
//! | [`QLearning`] | model enumeration + live environment | N episodes |
//!
//! Every solver owns its tables and its policy. The policy is only exposed
//! once training has completed successfully.
//!
//! # Examples
//!
//! ```
//! use ttt_mdp::{
//!     config::ValueIterationConfig,
//!     mdp::TabularMdp,
//!     solvers::{Solver, ValueIteration},
//! };
//!
//! let mdp = TabularMdp::builder(2)
//!     .transition(0, 0, 1.0, 10.0, 1)
//!     .transition(0, 1, 1.0, 1.0, 0)
//!     .terminal(1)
//!     .build()?;
//!
//! let mut solver = ValueIteration::new(mdp, ValueIterationConfig::default().with_discount(0.5))?;
//! let policy = solver.train()?;
//! assert_eq!(policy.get(&0), Some(&0));
//! # Ok::<(), ttt_mdp::Error>(())
//! ```

pub mod lookahead;
pub mod policy_iteration;
pub mod q_learning;
pub mod value_iteration;

use std::fmt;

use clap::ValueEnum;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    mdp::{MarkovModel, Policy, StateSpace},
};

pub use policy_iteration::{EvaluationReport, PolicyIteration};
pub use q_learning::{EpisodeStats, QLearning};
pub use value_iteration::ValueIteration;

pub(crate) type Space<M> = StateSpace<<M as MarkovModel>::State, <M as MarkovModel>::Action>;

/// Which algorithm produced a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    ValueIteration,
    PolicyIteration,
    QLearning,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverKind::ValueIteration => "value iteration",
            SolverKind::PolicyIteration => "policy iteration",
            SolverKind::QLearning => "Q-learning",
        };
        f.write_str(name)
    }
}

/// Diagnostics recorded by a finished training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Number of enumerated states
    pub states: usize,
    /// Sweeps (value iteration), improvement rounds (policy iteration) or
    /// episodes (Q-learning)
    pub iterations: usize,
    /// Whether the run met its own stopping condition rather than a cap
    pub converged: bool,
    /// Seed used for the random source, if any
    pub seed: Option<u64>,
}

/// Common interface of the solvers.
pub trait Solver {
    type State: Clone + Eq + std::hash::Hash + fmt::Debug;
    type Action: Clone + Eq + fmt::Debug;

    /// Run training to completion and return the resulting policy.
    ///
    /// # Errors
    ///
    /// Fails if a step of training fails (e.g. the environment rejects an
    /// action). No policy is stored in that case.
    fn train(&mut self) -> Result<&Policy<Self::State, Self::Action>>;

    /// Policy from the last successful [`Solver::train`] call.
    fn policy(&self) -> Option<&Policy<Self::State, Self::Action>>;

    fn kind(&self) -> SolverKind;

    /// Enumerated states in index order.
    fn space(&self) -> &StateSpace<Self::State, Self::Action>;

    fn metadata(&self) -> TrainingMetadata;

    fn name(&self) -> &str {
        match self.kind() {
            SolverKind::ValueIteration => "Value Iteration",
            SolverKind::PolicyIteration => "Policy Iteration",
            SolverKind::QLearning => "Q-Learning",
        }
    }
}

pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}
