//! Error types for the ttt-mdp crate

use thiserror::Error;

/// Main error type for the ttt-mdp crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("illegal action {action} in state {state}")]
    IllegalAction { state: String, action: String },

    #[error("non-terminal state {state} has no available actions")]
    NoActionsAvailable { state: String },

    #[error(
        "transition probabilities for action {action} in state {state} are invalid: {reason}"
    )]
    InvalidTransitionProbabilities {
        state: String,
        action: String,
        reason: String,
    },

    #[error("state {state} is not part of the enumerated state space")]
    UnknownState { state: String },

    #[error("no Q-table entry for action {action} in state {state}")]
    UnknownStateAction { state: String, action: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid move: position {position} is occupied or off the board")]
    InvalidMove { position: usize },

    #[error("game already over")]
    GameOver,

    #[error("invalid board length: expected {expected} cells, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("invalid piece counts: X={x_count}, O={o_count}")]
    InvalidPieceCounts { x_count: usize, o_count: usize },

    #[error("invalid player '{player}' in '{label}' (expected 'X' or 'O')")]
    InvalidPlayerString { player: String, label: String },

    #[error("random source failed: {message}")]
    RandomSource { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn illegal_action(state: &impl std::fmt::Debug, action: &impl std::fmt::Debug) -> Self {
        Error::IllegalAction {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
