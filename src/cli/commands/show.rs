//! Show command - inspect a saved policy

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output::{format_board_with_move, format_number, print_kv, print_section},
    persistence::SavedPolicy,
    tictactoe::BoardState,
};

#[derive(Parser, Debug)]
#[command(about = "Inspect a saved policy")]
pub struct ShowArgs {
    /// Path to a policy written by `train --output`
    pub policy: PathBuf,

    /// Board to look up, e.g. `X...O....` (append `_O` or `_X` to set the turn)
    #[arg(long, short = 'b')]
    pub board: Option<String>,
}

pub fn execute(args: ShowArgs) -> Result<()> {
    let saved = SavedPolicy::<BoardState, usize>::load_from_file(&args.policy)?;
    let policy = saved.to_policy()?;

    match &args.board {
        Some(raw) => {
            let board = BoardState::from_string(raw)
                .with_context(|| format!("Failed to parse board '{raw}'"))?;
            let chosen = policy.get(&board).copied();
            println!("{}", format_board_with_move(&board, chosen));
            match chosen {
                Some(pos) => println!("\nMove: {pos}"),
                None if board.is_terminal() => println!("\nGame is over, no move to make"),
                None => println!("\nNo move stored for this board"),
            }
        }
        None => {
            print_section(&format!("{} policy", saved.algorithm));
            print_kv("Format version", &saved.version.to_string());
            print_kv("Entries", &format_number(saved.len()));
            print_kv("States", &format_number(saved.metadata.states));
            print_kv("Iterations", &format_number(saved.metadata.iterations));
            print_kv("Converged", if saved.metadata.converged { "yes" } else { "no" });
            if let Some(seed) = saved.metadata.seed {
                print_kv("Seed", &seed.to_string());
            }

            let mut counts = [0usize; 9];
            for (_, pos) in &saved.entries {
                if let Some(count) = counts.get_mut(*pos) {
                    *count += 1;
                }
            }
            println!("\nHow often each cell is chosen:");
            for row in counts.chunks(3) {
                let cells: Vec<String> = row.iter().map(|c| format!("{c:>6}")).collect();
                println!("  {}", cells.join(" "));
            }

            let empty = BoardState::new();
            if let Some(&opening) = policy.get(&empty) {
                println!("\nOpening move:");
                println!("{}", format_board_with_move(&empty, Some(opening)));
            }
        }
    }

    Ok(())
}
