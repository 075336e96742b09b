//! qbattle CLI - Q-learning in a turn-based hero vs demon king battle
//!
//! This CLI provides a unified interface for:
//! - Training an agent and evaluating it greedily
//! - Replaying a saved agent, optionally printing battle logs
//! - Inspecting learned Q-values

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qbattle")]
#[command(version, about = "Tabular Q-learning for a turn-based battle", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent, then evaluate it
    Train(qbattle::cli::commands::train::TrainArgs),

    /// Evaluate a trained agent
    Evaluate(qbattle::cli::commands::evaluate::EvaluateArgs),

    /// Print the Q-values of a trained agent
    Inspect(qbattle::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => qbattle::cli::commands::train::execute(args),
        Commands::Evaluate(args) => qbattle::cli::commands::evaluate::execute(args),
        Commands::Inspect(args) => qbattle::cli::commands::inspect::execute(args),
    }
}
