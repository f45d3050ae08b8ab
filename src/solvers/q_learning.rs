//! Q-learning (off-policy TD control)
//!
//! Learns Q* from simulated episodes. Each step selects an action
//! ε-greedily, submits it to the environment, and applies
//!
//! Q(s,a) ← (1 − α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))
//!
//! where the max is 0 when s' is terminal. The model is only used to
//! enumerate states and their legal actions for the table; transitions come
//! from the environment.

use rand::{Rng, rngs::StdRng};

use super::{Solver, SolverKind, Space, TrainingMetadata, build_rng, lookahead};
use crate::{
    Error, Result,
    config::QLearningConfig,
    mdp::{Environment, MarkovModel, Outcome, Policy, QTable, StateSpace},
};

/// Summary of one training episode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeStats {
    /// Steps taken
    pub steps: usize,
    /// Undiscounted sum of rewards
    pub total_reward: f64,
    /// Whether the step cap ended the episode before a terminal state
    pub truncated: bool,
}

/// Q-learning solver.
#[derive(Debug, Clone)]
pub struct QLearning<M, E>
where
    M: MarkovModel,
    E: Environment<State = M::State, Action = M::Action>,
{
    model: M,
    env: E,
    space: Space<M>,
    q_table: QTable,
    config: QLearningConfig,
    epsilon: f64,
    rng: StdRng,
    episodes: usize,
    policy: Option<Policy<M::State, M::Action>>,
}

impl<M, E> QLearning<M, E>
where
    M: MarkovModel,
    E: Environment<State = M::State, Action = M::Action>,
{
    /// Enumerate the model and zero every (state, action) entry.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or a non-terminal state with no actions.
    pub fn new(model: M, env: E, config: QLearningConfig) -> Result<Self> {
        config.validate()?;
        let space = StateSpace::build(&model)?;
        let mut solver = Self {
            q_table: QTable::zeros(&space),
            epsilon: config.epsilon,
            rng: build_rng(config.seed),
            model,
            env,
            space,
            config,
            episodes: 0,
            policy: None,
        };
        solver.initialize();
        Ok(solver)
    }

    /// Construct and train in one step.
    pub fn solve(model: M, env: E, config: QLearningConfig) -> Result<Self> {
        let mut solver = Self::new(model, env, config)?;
        solver.train()?;
        Ok(solver)
    }

    /// Reset Q to 0 for every enumerated pair and ε to its initial value.
    pub fn initialize(&mut self) {
        self.q_table = QTable::zeros(&self.space);
        self.epsilon = self.config.epsilon;
        self.episodes = 0;
        self.policy = None;
    }

    /// ε-greedy choice among the legal actions of the state at `idx`.
    ///
    /// Returns the action's position in the state's action list.
    fn select_action(&mut self, idx: usize) -> Option<usize> {
        let n = self.space.actions(idx).len();
        if n == 0 {
            return None;
        }
        if self.rng.random::<f64>() < self.epsilon {
            Some(self.rng.random_range(0..n))
        } else {
            self.q_table.greedy_action(idx)
        }
    }

    /// Apply the TD update for one observed step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStateAction`] if the observed pair is not in
    /// the table.
    pub fn update(&mut self, outcome: &Outcome<M::State, M::Action>) -> Result<()> {
        let unknown = || Error::UnknownStateAction {
            state: format!("{:?}", outcome.state),
            action: format!("{:?}", outcome.action),
        };
        let idx = self.space.index_of(&outcome.state).ok_or_else(unknown)?;
        let action_idx = self
            .space
            .action_index(idx, &outcome.action)
            .ok_or_else(unknown)?;

        let max_next = self
            .space
            .index_of(&outcome.next_state)
            .map_or(0.0, |next| self.q_table.max_q(next));

        let alpha = self.config.learning_rate;
        let current = self.q_table.get(idx, action_idx);
        let target = outcome.reward + self.config.discount * max_next;
        self.q_table
            .set(idx, action_idx, (1.0 - alpha) * current + alpha * target);
        Ok(())
    }

    /// Play one episode from a fresh reset, learning after every step.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::IllegalAction`] from the environment without
    /// touching the Q-table, and fails with [`Error::UnknownState`] if the
    /// environment reaches a state that was never enumerated.
    pub fn run_episode(&mut self) -> Result<EpisodeStats> {
        self.env.reset();
        let mut stats = EpisodeStats::default();

        while !self.env.is_terminal() {
            if stats.steps == self.config.max_episode_steps {
                stats.truncated = true;
                log::debug!("episode truncated after {} steps", stats.steps);
                break;
            }

            let state = self.env.current_state();
            let idx = self.space.index_of(&state).ok_or_else(|| Error::UnknownState {
                state: format!("{state:?}"),
            })?;
            let action_idx = self.select_action(idx).ok_or_else(|| Error::NoActionsAvailable {
                state: format!("{state:?}"),
            })?;
            let action = self.space.actions(idx)[action_idx].clone();

            let outcome = self.env.step(&action)?;
            self.update(&outcome)?;

            stats.steps += 1;
            stats.total_reward += outcome.reward;
        }

        Ok(stats)
    }

    /// Decay ε after an episode.
    fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
    }

    /// Train for `config.episodes` episodes, calling `on_episode` after each.
    pub fn train_with<F>(&mut self, mut on_episode: F) -> Result<&Policy<M::State, M::Action>>
    where
        F: FnMut(usize, &EpisodeStats),
    {
        log::info!(
            "Q-learning: {} states, {} pairs, {} episodes, alpha {}, discount {}, epsilon {}",
            self.space.len(),
            self.q_table.size(),
            self.config.episodes,
            self.config.learning_rate,
            self.config.discount,
            self.epsilon
        );
        self.policy = None;

        let mut reward_sum = 0.0;
        let mut truncated = 0;
        for episode in 0..self.config.episodes {
            let stats = self.run_episode().inspect_err(|e| {
                log::error!("Q-learning episode {episode} failed: {e}");
            })?;
            reward_sum += stats.total_reward;
            if stats.truncated {
                truncated += 1;
            }
            self.episodes += 1;
            self.decay_epsilon();
            on_episode(episode, &stats);
        }

        if truncated > 0 {
            log::warn!("{truncated} episodes hit the {}-step cap", self.config.max_episode_steps);
        }

        let extracted = self.extract_policy();
        let policy = self.policy.insert(extracted);
        log::info!(
            "Q-learning finished: mean episode reward {:.4}, final epsilon {:.4}, {} policy entries",
            reward_sum / self.config.episodes.max(1) as f64,
            self.epsilon,
            policy.len()
        );
        Ok(&*policy)
    }

    /// Arg-max policy of the current Q-table.
    pub fn extract_policy(&self) -> Policy<M::State, M::Action> {
        lookahead::q_policy::<M>(&self.space, &self.q_table)
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_table_mut(&mut self) -> &mut QTable {
        &mut self.q_table
    }

    /// Q(state, action), 0 outside the table.
    pub fn q_value(&self, state: &M::State, action: &M::Action) -> f64 {
        self.q_table.value_of(&self.space, state, action)
    }

    /// Overwrite Q(state, action).
    pub fn set_q_value(&mut self, state: &M::State, action: &M::Action, value: f64) -> Result<()> {
        self.q_table.set_value(&self.space, state, action, value)
    }

    /// max_a Q(state, a), 0 for terminal or unknown states.
    pub fn state_value(&self, state: &M::State) -> f64 {
        self.space
            .index_of(state)
            .map_or(0.0, |idx| self.q_table.max_q(idx))
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }
}

impl<M, E> Solver for QLearning<M, E>
where
    M: MarkovModel,
    E: Environment<State = M::State, Action = M::Action>,
{
    type State = M::State;
    type Action = M::Action;

    fn train(&mut self) -> Result<&Policy<M::State, M::Action>> {
        self.train_with(|_, _| {})
    }

    fn policy(&self) -> Option<&Policy<M::State, M::Action>> {
        self.policy.as_ref()
    }

    fn kind(&self) -> SolverKind {
        SolverKind::QLearning
    }

    fn space(&self) -> &Space<M> {
        &self.space
    }

    fn metadata(&self) -> TrainingMetadata {
        TrainingMetadata {
            states: self.space.len(),
            iterations: self.episodes,
            converged: self.policy.is_some(),
            seed: self.config.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::{TabularEnvironment, TabularMdp};

    fn exit_or_loop() -> TabularMdp {
        TabularMdp::builder(2)
            .transition(0, 0, 1.0, 10.0, 1)
            .transition(0, 1, 1.0, 1.0, 0)
            .terminal(1)
            .build()
            .unwrap()
    }

    fn solver(config: QLearningConfig) -> QLearning<TabularMdp, TabularEnvironment> {
        let mdp = exit_or_loop();
        let env = TabularEnvironment::new(mdp.clone(), 11);
        QLearning::new(mdp, env, config).unwrap()
    }

    /// Rejects the `reject_at`-th step with [`Error::IllegalAction`].
    #[derive(Debug)]
    struct Refusing {
        inner: TabularEnvironment,
        steps: usize,
        reject_at: usize,
    }

    impl Environment for Refusing {
        type State = usize;
        type Action = usize;

        fn reset(&mut self) {
            self.inner.reset();
        }

        fn is_terminal(&self) -> bool {
            self.inner.is_terminal()
        }

        fn current_state(&self) -> usize {
            self.inner.current_state()
        }

        fn step(&mut self, action: &usize) -> Result<Outcome<usize, usize>> {
            self.steps += 1;
            if self.steps == self.reject_at {
                return Err(Error::illegal_action(&self.current_state(), action));
            }
            self.inner.step(action)
        }
    }

    #[test]
    fn test_illegal_action_aborts_training() {
        let mdp = exit_or_loop();
        let env = Refusing {
            inner: TabularEnvironment::new(mdp.clone(), 11),
            steps: 0,
            reject_at: 3,
        };
        let config = QLearningConfig::default()
            .with_learning_rate(0.5)
            .with_discount(0.5)
            .with_epsilon(0.0)
            .with_episodes(10);
        let mut solver = QLearning::new(mdp, env, config).unwrap();
        // Greedy play keeps choosing the loop.
        solver.set_q_value(&0, &1, 5.0).unwrap();

        let result = solver.train();
        assert!(matches!(result, Err(Error::IllegalAction { .. })));
        assert!(solver.policy().is_none());
        assert_eq!(solver.metadata().iterations, 0);

        // Two accepted loop steps: 5 -> 4.25 -> 3.6875, and nothing for the third.
        assert!((solver.q_value(&0, &1) - 3.6875).abs() < 1e-12);
        assert_eq!(solver.q_value(&0, &0), 0.0);
    }

    #[test]
    fn test_initialize_zeroes_every_pair() {
        let solver = solver(QLearningConfig::default());
        assert_eq!(solver.q_table().size(), 2);
        assert_eq!(solver.q_value(&0, &0), 0.0);
        assert_eq!(solver.q_value(&0, &1), 0.0);
        assert_eq!(solver.q_value(&1, &0), 0.0);
    }

    #[test]
    fn test_update_formula() {
        let config = QLearningConfig::default()
            .with_learning_rate(0.5)
            .with_discount(0.5);
        let mut solver = solver(config);
        solver.set_q_value(&0, &0, 8.0).unwrap();
        solver.set_q_value(&0, &1, 2.0).unwrap();

        // Q(0,B) <- 0.5 * 2 + 0.5 * (1 + 0.5 * max(8, 2)) = 3.5
        solver
            .update(&Outcome {
                state: 0,
                action: 1,
                reward: 1.0,
                next_state: 0,
            })
            .unwrap();
        assert!((solver.q_value(&0, &1) - 3.5).abs() < 1e-12);

        // Terminal next state contributes 0: Q(0,A) <- 0.5 * 8 + 0.5 * 10 = 9
        solver
            .update(&Outcome {
                state: 0,
                action: 0,
                reward: 10.0,
                next_state: 1,
            })
            .unwrap();
        assert!((solver.q_value(&0, &0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_rejects_unknown_pair() {
        let mut solver = solver(QLearningConfig::default());
        let result = solver.update(&Outcome {
            state: 1,
            action: 0,
            reward: 1.0,
            next_state: 1,
        });
        assert!(matches!(result, Err(Error::UnknownStateAction { .. })));
    }

    #[test]
    fn test_learns_exit() {
        let config = QLearningConfig::default()
            .with_discount(0.5)
            .with_learning_rate(0.5)
            .with_epsilon(0.3)
            .with_episodes(500)
            .with_seed(5);
        let mut solver = solver(config);
        let policy = solver.train().unwrap().clone();

        assert_eq!(policy.get(&0), Some(&0));
        assert_eq!(policy.get(&1), None);
        assert!((solver.q_value(&0, &0) - 10.0).abs() < 1e-6);
        assert!(solver.q_value(&0, &1) <= 6.0 + 1e-9);
    }

    #[test]
    fn test_greedy_fixed_point() {
        let config = QLearningConfig::default()
            .with_discount(0.5)
            .with_learning_rate(0.5)
            .with_epsilon(0.0)
            .with_episodes(1);
        let mut solver = solver(config);
        solver.set_q_value(&0, &0, 10.0).unwrap();
        solver.set_q_value(&0, &1, 6.0).unwrap();
        let before = solver.q_table().clone();

        solver.train().unwrap();
        assert_eq!(solver.q_table(), &before);
    }

    #[test]
    fn test_step_cap_truncates_loop() {
        // Only a self-loop: the episode can never end on its own.
        let mdp = TabularMdp::builder(2)
            .transition(0, 0, 1.0, 1.0, 0)
            .terminal(1)
            .build()
            .unwrap();
        let env = TabularEnvironment::new(mdp.clone(), 1);
        let config = QLearningConfig::default()
            .with_max_episode_steps(25)
            .with_episodes(2)
            .with_seed(1);
        let mut solver = QLearning::new(mdp, env, config).unwrap();
        let stats = solver.run_episode().unwrap();
        assert!(stats.truncated);
        assert_eq!(stats.steps, 25);
    }

    #[test]
    fn test_epsilon_decays_to_floor() {
        let config = QLearningConfig::default()
            .with_epsilon(0.5)
            .with_epsilon_decay(0.5, 0.1)
            .with_episodes(10)
            .with_seed(2);
        let mut solver = solver(config);
        let mut seen = Vec::new();
        solver.train_with(|episode, _| seen.push(episode)).unwrap();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        assert!((solver.epsilon() - 0.1).abs() < 1e-12);
    }
}
