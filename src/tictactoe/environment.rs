//! Live Tic-Tac-Toe episodes against a sampled opponent

use rand::{distr::Distribution, distr::weighted::WeightedIndex, rngs::StdRng};

use super::{BoardState, TicTacToeMdp};
use crate::{
    Error, Result,
    mdp::{Environment, Outcome},
    solvers::build_rng,
};

/// Steps one game at a time, sampling the opponent's replies from the same
/// distribution [`TicTacToeMdp`] uses for its transitions.
#[derive(Debug, Clone)]
pub struct TicTacToeEnvironment {
    mdp: TicTacToeMdp,
    board: BoardState,
    /// Last board successfully dealt by [`Self::deal`]
    opening: BoardState,
    rng: StdRng,
}

impl TicTacToeEnvironment {
    /// Create an environment and deal the first board.
    ///
    /// # Errors
    ///
    /// Fails if the opponent's opening cannot be sampled.
    pub fn new(mdp: TicTacToeMdp, seed: Option<u64>) -> Result<Self> {
        let start = mdp.start_board();
        let mut env = Self {
            board: start,
            opening: start,
            mdp,
            rng: build_rng(seed),
        };
        env.deal()?;
        Ok(env)
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn mdp(&self) -> &TicTacToeMdp {
        &self.mdp
    }

    /// Put the start board back and let the opponent open if it moves first.
    fn deal(&mut self) -> Result<()> {
        let openings = self.mdp.initial_states();
        self.board = self.sample(&openings)?;
        self.opening = self.board;
        Ok(())
    }

    fn sample(&mut self, boards: &[(BoardState, f64)]) -> Result<BoardState> {
        let dist = WeightedIndex::new(boards.iter().map(|(_, p)| *p)).map_err(|e| {
            Error::RandomSource {
                message: e.to_string(),
            }
        })?;
        Ok(boards[dist.sample(&mut self.rng)].0)
    }
}

impl Environment for TicTacToeEnvironment {
    type State = BoardState;
    type Action = usize;

    /// Deal a fresh opening. If the opponent cannot be sampled, the previous
    /// opening is replayed so the episode still starts on a decision board.
    fn reset(&mut self) {
        if let Err(e) = self.deal() {
            log::error!("failed to deal opening board, replaying the last one: {e}");
            self.board = self.opening;
        }
    }

    fn is_terminal(&self) -> bool {
        self.board.is_terminal()
    }

    fn current_state(&self) -> BoardState {
        self.board
    }

    fn step(&mut self, action: &usize) -> Result<Outcome<BoardState, usize>> {
        let after = self
            .board
            .make_move(*action)
            .map_err(|_| Error::illegal_action(&self.board, action))?;

        let next = if after.is_terminal() {
            after
        } else {
            let replies = self.mdp.opponent_replies(&after);
            self.sample(&replies)?
        };

        let outcome = Outcome {
            state: self.board,
            action: *action,
            reward: self.mdp.rewards().reward(&next),
            next_state: next,
        };
        self.board = next;
        Ok(outcome)
    }
}
