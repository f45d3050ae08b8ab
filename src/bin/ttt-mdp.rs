//! ttt-mdp CLI - solve Tic-Tac-Toe as a Markov decision process
//!
//! - `train`: run value iteration, policy iteration or Q-learning
//! - `show`: inspect a saved policy
//!
//! Set `RUST_LOG=info` (or `debug`) to follow the solvers' progress.

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ttt-mdp")]
#[command(version, about = "MDP solvers for Tic-Tac-Toe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a policy with one of the solvers
    Train(ttt_mdp::cli::commands::train::TrainArgs),

    /// Inspect a saved policy
    Show(ttt_mdp::cli::commands::show::ShowArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => ttt_mdp::cli::commands::train::execute(args),
        Commands::Show(args) => ttt_mdp::cli::commands::show::execute(args),
    }
}
