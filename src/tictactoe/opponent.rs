//! Scripted opponents
//!
//! An opponent is described by the probability distribution it plays from,
//! not by a sampled move. The MDP turns the distribution into transitions and
//! the live environment samples from the same distribution, so both views of
//! the game agree.

use std::{fmt, sync::Arc};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{BoardState, LineAnalyzer};

/// Which scripted opponent to play against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    /// Uniform over legal moves
    Random,
    /// Wins when it can, blocks when it must, otherwise random
    Defensive,
}

impl OpponentKind {
    /// Creates a shared opponent trait object from the kind
    pub fn into_model(self) -> Arc<dyn OpponentModel> {
        match self {
            OpponentKind::Random => Arc::new(RandomOpponent),
            OpponentKind::Defensive => Arc::new(DefensiveOpponent),
        }
    }
}

impl fmt::Display for OpponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpponentKind::Random => f.write_str("random"),
            OpponentKind::Defensive => f.write_str("defensive"),
        }
    }
}

/// Move distribution of the player to move in a board
pub trait OpponentModel: fmt::Debug + Send + Sync {
    fn kind(&self) -> OpponentKind;

    /// `(position, probability)` pairs over legal moves, ascending by
    /// position, probabilities summing to 1. Empty for finished games.
    fn move_distribution(&self, board: &BoardState) -> Vec<(usize, f64)>;
}

fn uniform(moves: &[usize]) -> Vec<(usize, f64)> {
    let p = 1.0 / moves.len() as f64;
    moves.iter().map(|&m| (m, p)).collect()
}

/// Opponent that plays uniformly at random
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOpponent;

impl OpponentModel for RandomOpponent {
    fn kind(&self) -> OpponentKind {
        OpponentKind::Random
    }

    fn move_distribution(&self, board: &BoardState) -> Vec<(usize, f64)> {
        uniform(&board.legal_moves())
    }
}

/// Opponent that takes a win, else blocks, else plays at random
#[derive(Debug, Clone, Copy, Default)]
pub struct DefensiveOpponent;

impl OpponentModel for DefensiveOpponent {
    fn kind(&self) -> OpponentKind {
        OpponentKind::Defensive
    }

    fn move_distribution(&self, board: &BoardState) -> Vec<(usize, f64)> {
        if board.is_terminal() {
            return Vec::new();
        }

        let wins = LineAnalyzer::winning_moves(&board.cells, board.to_move);
        if !wins.is_empty() {
            return uniform(&wins);
        }

        let blocks = LineAnalyzer::blocking_moves(&board.cells, board.to_move);
        if !blocks.is_empty() {
            return uniform(&blocks);
        }

        uniform(&board.legal_moves())
    }
}
