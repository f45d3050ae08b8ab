//! Markov decision process solvers for Tic-Tac-Toe
//!
//! This crate provides:
//! - Generic MDP contracts (transition model and live environment) with
//!   dense state indexing
//! - Value iteration, policy iteration and Q-learning over those contracts
//! - Tic-Tac-Toe against scripted opponents as a concrete MDP
//! - A saved-policy file format and a small CLI

pub mod cli;
pub mod config;
pub mod error;
pub mod mdp;
pub mod persistence;
pub mod solvers;
pub mod tictactoe;

pub use error::{Error, Result};
pub use mdp::{Environment, MarkovModel, Policy};
pub use solvers::{PolicyIteration, QLearning, Solver, SolverKind, ValueIteration};
