//! Train command - solve Tic-Tac-Toe with one of the MDP solvers

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::{
    cli::{
        config::TrainingFile,
        output::{
            create_spinner, create_training_progress, format_board_with_move, format_number,
            print_kv, print_section,
        },
    },
    persistence::SavedPolicy,
    solvers::{PolicyIteration, QLearning, Solver, SolverKind, ValueIteration},
    tictactoe::{BoardState, OpponentKind, Player, TicTacToeEnvironment, TicTacToeMdp},
};

pub(crate) fn parse_player_token(value: &str, flag: &str) -> Result<Player> {
    match value.trim().to_ascii_lowercase().as_str() {
        "x" | "first" | "agent" => Ok(Player::X),
        "o" | "second" | "opponent" => Ok(Player::O),
        other => Err(anyhow!(
            "Invalid value '{other}' for {flag} (expected 'x' or 'o')"
        )),
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a Tic-Tac-Toe policy")]
pub struct TrainArgs {
    /// Solver to run
    #[arg(long, short = 's', value_enum, default_value_t = SolverKind::ValueIteration)]
    pub solver: SolverKind,

    /// JSON file with solver and reward settings
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Which player opens the game (`x` = agent, `o` = opponent)
    #[arg(long, default_value = "x")]
    pub first: String,

    /// Opponent to train against
    #[arg(long, short = 'o', value_enum, default_value_t = OpponentKind::Random)]
    pub opponent: OpponentKind,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of Q-learning episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Output file for the trained policy
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let first_player = parse_player_token(&args.first, "--first")?;
    let mut settings = match &args.config {
        Some(path) => TrainingFile::load(path)?,
        None => TrainingFile::default(),
    }
    .with_seed(args.seed);
    if let Some(episodes) = args.episodes {
        settings.q_learning.episodes = episodes;
    }

    let mdp = TicTacToeMdp::new(first_player, args.opponent.into_model(), settings.rewards);
    let openings = mdp.initial_states();

    println!(
        "Training {} as X against the {} opponent ({} moves first)",
        args.solver,
        args.opponent,
        first_player.to_char()
    );

    match args.solver {
        SolverKind::ValueIteration => {
            let mut solver = ValueIteration::new(mdp, settings.value_iteration)?;
            let spinner = spinner_unless(args.quiet, "Running value iteration...");
            solver.train()?;
            finish(spinner);
            let start_value = expected_value(&openings, |b| solver.value_of(b));
            report(&solver, start_value, &args)
        }
        SolverKind::PolicyIteration => {
            let mut solver = PolicyIteration::new(mdp, settings.policy_iteration)?;
            let spinner = spinner_unless(args.quiet, "Running policy iteration...");
            solver.train()?;
            finish(spinner);
            let start_value = expected_value(&openings, |b| solver.value_of(b));
            report(&solver, start_value, &args)
        }
        SolverKind::QLearning => {
            let env = TicTacToeEnvironment::new(mdp.clone(), settings.q_learning.seed)?;
            let mut solver = QLearning::new(mdp, env, settings.q_learning)?;
            let progress =
                (!args.quiet).then(|| create_training_progress(solver.config().episodes as u64));

            let mut wins = 0usize;
            solver.train_with(|episode, stats| {
                if stats.total_reward > 0.0 {
                    wins += 1;
                }
                if let Some(pb) = &progress {
                    pb.inc(1);
                    if (episode + 1) % 1000 == 0 {
                        pb.set_message(format!(
                            "win rate {:.1}%",
                            100.0 * wins as f64 / (episode + 1) as f64
                        ));
                    }
                }
            })?;
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }

            let start_value = expected_value(&openings, |b| solver.state_value(b));
            report(&solver, start_value, &args)
        }
    }
}

fn spinner_unless(quiet: bool, message: &str) -> Option<indicatif::ProgressBar> {
    if quiet {
        return None;
    }
    let spinner = create_spinner(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(spinner)
}

fn finish(spinner: Option<indicatif::ProgressBar>) {
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
}

/// Value of the game before X's first decision, averaged over the openings.
fn expected_value(openings: &[(BoardState, f64)], value: impl Fn(&BoardState) -> f64) -> f64 {
    openings.iter().map(|(board, p)| p * value(board)).sum()
}

fn report<T>(solver: &T, start_value: f64, args: &TrainArgs) -> Result<()>
where
    T: Solver<State = BoardState, Action = usize>,
{
    let policy = solver
        .policy()
        .ok_or_else(|| anyhow!("{} produced no policy", solver.name()))?;
    let metadata = solver.metadata();

    print_section(&format!("{} results", solver.name()));
    print_kv("States", &format_number(metadata.states));
    print_kv("Policy entries", &format_number(policy.len()));
    let iterations_label = match solver.kind() {
        SolverKind::ValueIteration => "Sweeps",
        SolverKind::PolicyIteration => "Improvement rounds",
        SolverKind::QLearning => "Episodes",
    };
    print_kv(iterations_label, &format_number(metadata.iterations));
    print_kv("Converged", if metadata.converged { "yes" } else { "no" });
    print_kv("Start value", &format!("{start_value:.4}"));
    if let Some(seed) = metadata.seed {
        print_kv("Seed", &seed.to_string());
    }

    let empty = BoardState::new();
    if let Some(&opening) = policy.get(&empty) {
        println!("\nOpening move:");
        println!("{}", format_board_with_move(&empty, Some(opening)));
    }

    if let Some(path) = &args.output {
        let saved = SavedPolicy::from_solver(solver)?;
        saved.save_to_file(path)?;
        println!("\nSaved {} policy entries to {}", saved.len(), path.display());
    }

    Ok(())
}
