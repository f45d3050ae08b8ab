//! Explicit finite MDPs given as transition tables
//!
//! States are `0..n` and actions are arbitrary `usize` labels per state.
//! Useful for synthetic problems with known optima and for exercising the
//! solvers without a game behind them.

use rand::{SeedableRng, distr::Distribution, distr::weighted::WeightedIndex, rngs::StdRng};

use super::{Environment, MarkovModel, Outcome, Transition};
use crate::{Error, Result};

/// Finite MDP backed by a transition table.
///
/// # Examples
///
/// ```
/// use ttt_mdp::mdp::{MarkovModel, TabularMdp};
///
/// // S0 --A(10)--> S1 (terminal), S0 --B(1)--> S0
/// let mdp = TabularMdp::builder(2)
///     .transition(0, 0, 1.0, 10.0, 1)
///     .transition(0, 1, 1.0, 1.0, 0)
///     .terminal(1)
///     .build()
///     .unwrap();
///
/// assert_eq!(mdp.legal_actions(&0), vec![0, 1]);
/// assert!(mdp.is_terminal(&1));
/// ```
#[derive(Debug, Clone)]
pub struct TabularMdp {
    /// Per state: (action, transitions) in insertion order
    table: Vec<Vec<(usize, Vec<Transition<usize>>)>>,
    terminal: Vec<bool>,
    start: usize,
}

/// Builder for [`TabularMdp`].
#[derive(Debug, Clone)]
pub struct TabularMdpBuilder {
    n_states: usize,
    entries: Vec<(usize, usize, Transition<usize>)>,
    terminal: Vec<usize>,
    start: usize,
}

impl TabularMdpBuilder {
    /// Add a transition `state --action--> next_state` with `probability`
    /// and `reward`.
    pub fn transition(
        mut self,
        state: usize,
        action: usize,
        probability: f64,
        reward: f64,
        next_state: usize,
    ) -> Self {
        self.entries.push((
            state,
            action,
            Transition::new(probability, reward, next_state),
        ));
        self
    }

    pub fn terminal(mut self, state: usize) -> Self {
        self.terminal.push(state);
        self
    }

    /// State episodes start from. Defaults to 0.
    pub fn start(mut self, state: usize) -> Self {
        self.start = state;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for out-of-range states or
    /// transitions leaving a terminal state.
    pub fn build(self) -> Result<TabularMdp> {
        let n = self.n_states;
        let check = |s: usize, what: &str| {
            if s < n {
                Ok(())
            } else {
                Err(Error::invalid_config(format!(
                    "{what} {s} out of range for {n} states"
                )))
            }
        };

        check(self.start, "start state")?;
        let mut terminal = vec![false; n];
        for &s in &self.terminal {
            check(s, "terminal state")?;
            terminal[s] = true;
        }

        let mut table: Vec<Vec<(usize, Vec<Transition<usize>>)>> = vec![Vec::new(); n];
        for (state, action, transition) in self.entries {
            check(state, "state")?;
            check(transition.next_state, "next state")?;
            if terminal[state] {
                return Err(Error::invalid_config(format!(
                    "terminal state {state} cannot have transitions"
                )));
            }
            let row = &mut table[state];
            match row.iter_mut().find(|(a, _)| *a == action) {
                Some((_, transitions)) => transitions.push(transition),
                None => row.push((action, vec![transition])),
            }
        }

        Ok(TabularMdp {
            table,
            terminal,
            start: self.start,
        })
    }
}

impl TabularMdp {
    pub fn builder(n_states: usize) -> TabularMdpBuilder {
        TabularMdpBuilder {
            n_states,
            entries: Vec::new(),
            terminal: Vec::new(),
            start: 0,
        }
    }

    pub fn n_states(&self) -> usize {
        self.table.len()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    fn row(&self, state: usize, action: usize) -> Option<&[Transition<usize>]> {
        self.table
            .get(state)?
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, transitions)| transitions.as_slice())
    }
}

impl MarkovModel for TabularMdp {
    type State = usize;
    type Action = usize;

    fn enumerate_states(&self) -> Vec<usize> {
        (0..self.table.len()).collect()
    }

    fn legal_actions(&self, state: &usize) -> Vec<usize> {
        self.table
            .get(*state)
            .map(|row| row.iter().map(|(a, _)| *a).collect())
            .unwrap_or_default()
    }

    fn is_terminal(&self, state: &usize) -> bool {
        self.terminal.get(*state).copied().unwrap_or(false)
    }

    fn transitions(&self, state: &usize, action: &usize) -> Vec<Transition<usize>> {
        self.row(*state, *action)
            .map(<[_]>::to_vec)
            .unwrap_or_default()
    }
}

/// Samples episodes from a [`TabularMdp`].
#[derive(Debug, Clone)]
pub struct TabularEnvironment {
    mdp: TabularMdp,
    state: usize,
    rng: StdRng,
}

impl TabularEnvironment {
    pub fn new(mdp: TabularMdp, seed: u64) -> Self {
        let state = mdp.start;
        Self {
            mdp,
            state,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn mdp(&self) -> &TabularMdp {
        &self.mdp
    }
}

impl Environment for TabularEnvironment {
    type State = usize;
    type Action = usize;

    fn reset(&mut self) {
        self.state = self.mdp.start;
    }

    fn is_terminal(&self) -> bool {
        self.mdp.is_terminal(&self.state)
    }

    fn current_state(&self) -> usize {
        self.state
    }

    fn step(&mut self, action: &usize) -> Result<Outcome<usize, usize>> {
        let transitions = self
            .mdp
            .row(self.state, *action)
            .ok_or_else(|| Error::illegal_action(&self.state, action))?;

        let dist = WeightedIndex::new(transitions.iter().map(|t| t.probability)).map_err(|e| {
            Error::RandomSource {
                message: e.to_string(),
            }
        })?;
        let chosen = &transitions[dist.sample(&mut self.rng)];

        let outcome = Outcome {
            state: self.state,
            action: *action,
            reward: chosen.reward,
            next_state: chosen.next_state,
        };
        self.state = chosen.next_state;
        Ok(outcome)
    }
}
