//! Tic-Tac-Toe as the game the solvers learn to play
//!
//! The agent plays X against a scripted opponent. [`TicTacToeMdp`] exposes
//! the full transition model for the planning solvers and
//! [`TicTacToeEnvironment`] plays live games for Q-learning.

pub mod board;
pub mod environment;
pub mod lines;
pub mod mdp;
pub mod opponent;

pub use board::{BoardState, Cell, Player};
pub use environment::TicTacToeEnvironment;
pub use lines::{LineAnalyzer, WINNING_LINES};
pub use mdp::{RewardConfig, TicTacToeMdp};
pub use opponent::{DefensiveOpponent, OpponentKind, OpponentModel, RandomOpponent};
