//! Tic-Tac-Toe as a Markov decision process
//!
//! The agent plays X. A decision state is a board with X to move; the
//! opponent's reply is folded into the transition, so one MDP step covers
//! X's move and (unless the game ended) O's answer drawn from the opponent
//! model's distribution.

use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use super::{BoardState, OpponentKind, OpponentModel, Player};
use crate::mdp::{MarkovModel, Transition};

/// Reward for entering a board, seen from X.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub win: f64,
    pub lose: f64,
    pub draw: f64,
    /// Reward for a move that leaves the game running
    pub living: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            win: 10.0,
            lose: -10.0,
            draw: 0.0,
            living: 0.0,
        }
    }
}

impl RewardConfig {
    pub fn reward(&self, board: &BoardState) -> f64 {
        match board.winner() {
            Some(Player::X) => self.win,
            Some(Player::O) => self.lose,
            None if board.is_draw() => self.draw,
            None => self.living,
        }
    }
}

/// Tic-Tac-Toe against a fixed opponent model.
#[derive(Debug, Clone)]
pub struct TicTacToeMdp {
    first_player: Player,
    opponent: Arc<dyn OpponentModel>,
    rewards: RewardConfig,
}

impl TicTacToeMdp {
    pub fn new(first_player: Player, opponent: Arc<dyn OpponentModel>, rewards: RewardConfig) -> Self {
        Self {
            first_player,
            opponent,
            rewards,
        }
    }

    /// X moves first against `opponent` with the default rewards.
    pub fn against(opponent: OpponentKind) -> Self {
        Self::new(Player::X, opponent.into_model(), RewardConfig::default())
    }

    pub fn first_player(&self) -> Player {
        self.first_player
    }

    pub fn opponent(&self) -> &Arc<dyn OpponentModel> {
        &self.opponent
    }

    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    /// The empty board with the first player to move.
    pub fn start_board(&self) -> BoardState {
        BoardState::new_with_player(self.first_player)
    }

    /// Distribution over the first board on which X decides.
    ///
    /// The empty board when X opens, otherwise one entry per opening the
    /// opponent may play.
    pub fn initial_states(&self) -> Vec<(BoardState, f64)> {
        let start = self.start_board();
        if start.to_move == Player::X {
            return vec![(start, 1.0)];
        }
        self.opponent_replies(&start)
    }

    /// Boards reached by each opponent reply in `board`, with probabilities.
    pub fn opponent_replies(&self, board: &BoardState) -> Vec<(BoardState, f64)> {
        self.opponent
            .move_distribution(board)
            .into_iter()
            .filter_map(|(pos, p)| board.make_move(pos).ok().map(|next| (next, p)))
            .collect()
    }
}

impl MarkovModel for TicTacToeMdp {
    type State = BoardState;
    type Action = usize;

    /// Breadth-first over every reachable board, keeping boards where X is
    /// to move or the game is over.
    fn enumerate_states(&self) -> Vec<BoardState> {
        let start = self.start_board();
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut states = Vec::new();

        while let Some(board) = queue.pop_front() {
            let terminal = board.is_terminal();
            if terminal || board.to_move == Player::X {
                states.push(board);
            }
            if terminal {
                continue;
            }
            for pos in board.legal_moves() {
                if let Ok(next) = board.make_move(pos) {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        states
    }

    fn legal_actions(&self, board: &BoardState) -> Vec<usize> {
        if board.to_move != Player::X {
            return Vec::new();
        }
        board.legal_moves()
    }

    fn is_terminal(&self, board: &BoardState) -> bool {
        board.is_terminal()
    }

    fn transitions(&self, board: &BoardState, action: &usize) -> Vec<Transition<BoardState>> {
        let Ok(after) = board.make_move(*action) else {
            return Vec::new();
        };
        if after.is_terminal() {
            return vec![Transition::new(1.0, self.rewards.reward(&after), after)];
        }
        self.opponent_replies(&after)
            .into_iter()
            .map(|(next, p)| Transition::new(p, self.rewards.reward(&next), next))
            .collect()
    }
}
