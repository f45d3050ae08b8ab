//! Hyper-parameters for the solvers.
//!
//! Each config has `Default` values matching the classic tic-tac-toe agents,
//! builder-style setters, and a `validate` check run by the solver
//! constructors.
//!
//! # Examples
//!
//! ```
//! use ttt_mdp::config::QLearningConfig;
//!
//! let config = QLearningConfig::default()
//!     .with_episodes(50_000)
//!     .with_epsilon(0.2)
//!     .with_epsilon_decay(0.9995, 0.01)
//!     .with_seed(42);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn check_discount(discount: f64) -> Result<()> {
    if discount > 0.0 && discount < 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "discount {discount} must lie in (0, 1)"
        )))
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "{name} {value} must lie in [0, 1]"
        )))
    }
}

/// Value iteration: a fixed number of synchronous sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueIterationConfig {
    /// Discount factor γ
    pub discount: f64,
    /// Number of Bellman-optimality sweeps k
    pub iterations: usize,
}

impl ValueIterationConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_discount(self.discount)
    }
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            iterations: 50,
        }
    }
}

/// Policy iteration: exact evaluation alternated with greedy improvement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyIterationConfig {
    /// Discount factor γ
    pub discount: f64,
    /// Evaluation stops once no value moves by more than this
    pub delta: f64,
    /// Sweep cap for one policy evaluation
    pub max_evaluation_sweeps: usize,
    /// Cap on evaluate/improve rounds
    pub max_improvements: usize,
    /// Seed for the random initial policy
    pub seed: Option<u64>,
}

impl PolicyIterationConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_max_evaluation_sweeps(mut self, sweeps: usize) -> Self {
        self.max_evaluation_sweeps = sweeps;
        self
    }

    pub fn with_max_improvements(mut self, rounds: usize) -> Self {
        self.max_improvements = rounds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_discount(self.discount)?;
        if self.delta.is_nan() || self.delta <= 0.0 {
            return Err(Error::invalid_config(format!(
                "delta {} must be positive",
                self.delta
            )));
        }
        if self.max_evaluation_sweeps == 0 || self.max_improvements == 0 {
            return Err(Error::invalid_config(
                "sweep and improvement caps must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for PolicyIterationConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            delta: 0.1,
            max_evaluation_sweeps: 10_000,
            max_improvements: 1_000,
            seed: None,
        }
    }
}

/// Q-learning: ε-greedy episodes with temporal-difference updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount: f64,
    /// Initial exploration rate ε
    pub epsilon: f64,
    /// Multiplicative ε decay applied after every episode
    pub epsilon_decay: f64,
    /// Floor for the decayed ε
    pub min_epsilon: f64,
    /// Number of training episodes N
    pub episodes: usize,
    /// Step cap per episode
    pub max_episode_steps: usize,
    /// Seed for exploration
    pub seed: Option<u64>,
}

impl QLearningConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Anneal ε by `decay` per episode, never below `min_epsilon`.
    pub fn with_epsilon_decay(mut self, decay: f64, min_epsilon: f64) -> Self {
        self.epsilon_decay = decay;
        self.min_epsilon = min_epsilon;
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_max_episode_steps(mut self, steps: usize) -> Self {
        self.max_episode_steps = steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_discount(self.discount)?;
        check_unit("learning rate", self.learning_rate)?;
        check_unit("epsilon", self.epsilon)?;
        check_unit("epsilon decay", self.epsilon_decay)?;
        check_unit("minimum epsilon", self.min_epsilon)?;
        if self.max_episode_steps == 0 {
            return Err(Error::invalid_config("episode step cap must be at least 1"));
        }
        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.9,
            epsilon: 0.1,
            epsilon_decay: 1.0,
            min_epsilon: 0.0,
            episodes: 10_000,
            max_episode_steps: 10_000,
            seed: None,
        }
    }
}
