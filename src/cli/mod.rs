//! Command-line interface for training and inspecting Tic-Tac-Toe policies

pub mod commands;
pub mod config;
pub mod output;
