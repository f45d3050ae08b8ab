//! Output formatting and progress bars for CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::tictactoe::{BoardState, Cell};

/// Create a progress bar for Q-learning episodes
pub fn create_training_progress(total_episodes: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_episodes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
            .expect("Invalid progress bar template")
            .progress_chars("=>-"),
    );
    pb
}

/// Create a spinner for planning solvers, which have no episode count
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Render a board with the chosen move marked `*` and empty cells numbered
pub fn format_board_with_move(board: &BoardState, chosen: Option<usize>) -> String {
    let mut out = String::new();
    for row in 0..3 {
        out.push_str("  ");
        for col in 0..3 {
            let pos = row * 3 + col;
            let symbol = match board.get(pos) {
                _ if Some(pos) == chosen => '*',
                Cell::Empty => char::from_digit(pos as u32, 10).unwrap_or('.'),
                cell => cell.to_char(),
            };
            out.push(symbol);
            if col < 2 {
                out.push(' ');
            }
        }
        if row < 2 {
            out.push('\n');
        }
    }
    out
}
