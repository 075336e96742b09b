//! Evaluate command - Replay a saved agent against the opponent

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use crate::{
    battle::BattleEngine,
    cli::output::{print_kv, print_result, print_section, print_subsection},
    pipeline::{
        BattleLogObserver, ProgressObserver, TrainingConfig, TrainingPipeline, TrainingResult,
    },
    q_learning::{LearnedPolicy, SavedQAgent},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained agent")]
pub struct EvaluateArgs {
    /// Path to trained agent file
    pub agent: PathBuf,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 1000)]
    pub episodes: usize,

    /// Exploration rate while evaluating
    #[arg(long, default_value_t = 0.0)]
    pub epsilon: f64,

    /// Turns after which an episode is abandoned
    #[arg(long, default_value_t = 500)]
    pub max_turns: usize,

    /// Random seed for reproducibility (defaults to the training seed + 1)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the battle log of the first N episodes
    #[arg(long)]
    pub show_log: Option<usize>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Export results to file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    println!("Loading trained agent from: {}", args.agent.display());
    let saved = SavedQAgent::load_from_file(&args.agent)?;
    let mut agent = saved.to_agent()?;

    print_section("Loaded Agent");
    if let Some(episodes) = saved.metadata.episodes_trained {
        print_kv("Episodes trained", &episodes.to_string());
    }
    if let Some(opponent) = &saved.metadata.opponent {
        print_kv("Trained against", opponent);
    }
    if let Some(rate) = saved.metadata.evaluation_win_rate {
        print_kv("Recorded win rate", &format!("{:.1}%", rate * 100.0));
    }
    print_kv("Visited states", &agent.q_table().len().to_string());

    let evaluation_seed = evaluation_seed(args.seed, saved.metadata.seed);

    let mut engine = BattleEngine::new(saved.battle.clone())?;
    if let Some(seed) = evaluation_seed {
        engine.set_rng_seed(seed);
    }

    agent.set_epsilon(args.epsilon);
    let mut policy = LearnedPolicy::new(agent, saved.discretizer);

    let config = TrainingConfig {
        episodes: args.episodes,
        seed: evaluation_seed,
        max_turns: args.max_turns,
    };
    let mut pipeline = TrainingPipeline::new(config);
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(limit) = args.show_log {
        pipeline = pipeline.with_observer(Box::new(BattleLogObserver::new().with_limit(limit)));
    }

    print_subsection("Running Evaluation");
    print_kv("Episodes", &args.episodes.to_string());
    print_kv("Epsilon", &args.epsilon.to_string());
    if let Some(seed) = evaluation_seed {
        print_kv("Seed", &seed.to_string());
    }
    let result = pipeline.evaluate(&mut engine, &mut policy)?;

    print_subsection("Evaluation Results");
    print_result(&result);

    if let Some(export_path) = &args.export {
        export_results(&result, &saved, &args, export_path)?;
        println!("\n✓ Results exported to: {}", export_path.display());
    }

    Ok(())
}

/// Seed for both the battle and the agent: `--seed`, else training seed + 1
fn evaluation_seed(requested: Option<u64>, trained: Option<u64>) -> Option<u64> {
    requested.or_else(|| trained.map(|s| s.wrapping_add(1)))
}

/// Export evaluation results to JSON
fn export_results(
    result: &TrainingResult,
    saved: &SavedQAgent,
    args: &EvaluateArgs,
    path: &Path,
) -> Result<()> {
    use std::fs::File;

    #[derive(Serialize)]
    struct EvaluationExport<'a> {
        agent_file: String,
        epsilon: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        episodes_trained: Option<usize>,
        result: &'a TrainingResult,
    }

    let export = EvaluationExport {
        agent_file: args.agent.display().to_string(),
        epsilon: args.epsilon,
        episodes_trained: saved.metadata.episodes_trained,
        result,
    };

    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &export)?;
    Ok(())
}
