//! Train command - Train a Q-learning agent, then evaluate it greedily

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    app::{AgentConfig, AppContainer, BattleConfig, ExperimentConfig},
    battle::RandomPolicy,
    cli::output::{format_number, print_kv, print_result, print_section, print_subsection},
    pipeline::{
        JsonlObserver, ProgressObserver, TrainingConfig, TrainingPipeline, TrainingResult,
    },
    q_learning::{LearnedPolicy, SavedQAgent, TrainingMetadata},
};

#[derive(Debug, Serialize)]
struct SummaryStats {
    total_episodes: usize,
    wins: usize,
    losses: usize,
    truncated: usize,
    win_rate: f64,
    loss_rate: f64,
    mean_turns: f64,
    mean_turns_to_win: Option<f64>,
}

impl From<&TrainingResult> for SummaryStats {
    fn from(result: &TrainingResult) -> Self {
        Self {
            total_episodes: result.total_episodes,
            wins: result.wins,
            losses: result.losses,
            truncated: result.truncated,
            win_rate: result.win_rate,
            loss_rate: result.loss_rate,
            mean_turns: result.mean_turns,
            mean_turns_to_win: result.mean_turns_to_win,
        }
    }
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    baseline: Option<SummaryStats>,
    training: SummaryStats,
    evaluation: SummaryStats,
    metadata: SummaryMetadata,
}

#[derive(Debug, Serialize)]
struct SummaryMetadata {
    learning_rate: f64,
    discount_factor: f64,
    epsilon: f64,
    evaluation_epsilon: f64,
    buckets: usize,
    max_turns: usize,
    visited_states: usize,
    seed: Option<u64>,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent against the demon king")]
pub struct TrainArgs {
    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 1000)]
    pub episodes: usize,

    /// Number of greedy evaluation episodes after training
    #[arg(long, default_value_t = 1000)]
    pub eval_episodes: usize,

    /// Exploration rate during training
    #[arg(long, default_value_t = 0.2)]
    pub epsilon: f64,

    /// Exploration rate during evaluation
    #[arg(long, default_value_t = 0.0)]
    pub eval_epsilon: f64,

    /// Multiplicative ε decay applied after every training episode
    #[arg(long, default_value_t = 1.0)]
    pub epsilon_decay: f64,

    /// Floor for ε decay
    #[arg(long, default_value_t = 0.0)]
    pub min_epsilon: f64,

    /// Learning rate α
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Discount factor γ
    #[arg(long, default_value_t = 0.9)]
    pub discount: f64,

    /// HP buckets per combatant
    #[arg(long, default_value_t = 10)]
    pub buckets: usize,

    /// Turns after which an episode is abandoned
    #[arg(long, default_value_t = 500)]
    pub max_turns: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Play random-action episodes first as a baseline
    #[arg(long, default_value_t = false)]
    pub baseline: bool,

    /// Output file for trained agent
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Optional file for JSONL observations of the training episodes
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

impl TrainArgs {
    fn agent_config(&self) -> AgentConfig {
        let config = AgentConfig::default()
            .with_learning_rate(self.learning_rate)
            .with_discount_factor(self.discount)
            .with_epsilon(self.epsilon)
            .with_evaluation_epsilon(self.eval_epsilon)
            .with_epsilon_decay(self.epsilon_decay, self.min_epsilon)
            .with_buckets(self.buckets);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    fn experiment_config(&self) -> ExperimentConfig {
        ExperimentConfig {
            training_episodes: self.episodes,
            evaluation_episodes: self.eval_episodes,
            max_turns: self.max_turns,
        }
    }
}

fn pipeline(
    episodes: usize,
    seed: Option<u64>,
    max_turns: usize,
    progress: bool,
) -> TrainingPipeline {
    let config = TrainingConfig {
        episodes,
        seed,
        max_turns,
    };
    let pipeline = TrainingPipeline::new(config);
    if progress {
        pipeline.with_observer(Box::new(ProgressObserver::new()))
    } else {
        pipeline
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let container = AppContainer::new(BattleConfig::default(), args.agent_config())?;
    let experiment = args.experiment_config();
    let summary_target = args.summary.as_ref().map(|raw| {
        let sanitized = sanitize_summary_path(raw);
        let normalized = sanitized != *raw;
        (sanitized, normalized)
    });

    let mut engine = container.create_engine()?;
    let discretizer = container.create_discretizer()?;
    let mut agent = container.create_agent()?;
    let agent_config = container.agent_config();

    print_section("Q-Learning Battle Training");
    print_kv(
        "Matchup",
        &format!(
            "{} vs {} ({})",
            engine.controllable().name,
            engine.opponent().name,
            engine.opponent_policy_name()
        ),
    );
    print_kv("Episodes", &format_number(experiment.training_episodes));
    print_kv("Learning rate", &agent_config.learning_rate.to_string());
    print_kv("Discount", &agent_config.discount_factor.to_string());
    print_kv("Epsilon", &agent_config.epsilon.to_string());
    print_kv("States", &format_number(discretizer.state_count()));
    if let Some(seed) = args.seed {
        print_kv("Seed", &seed.to_string());
    }

    let baseline = if args.baseline {
        let mut random = RandomPolicy::new("Random");
        let result = pipeline(
            experiment.evaluation_episodes,
            args.seed.map(|s| s.wrapping_add(2)),
            experiment.max_turns,
            args.progress,
        )
        .evaluate(&mut engine, &mut random)?;
        print_subsection("Random Baseline");
        print_result(&result);
        Some(result)
    } else {
        None
    };

    let mut training = pipeline(
        experiment.training_episodes,
        args.seed,
        experiment.max_turns,
        args.progress,
    );
    if let Some(path) = &args.observations {
        training = training.with_observer(Box::new(JsonlObserver::new(path)?));
    }
    let training_result = training.train(&mut engine, &mut agent, &discretizer)?;
    print_subsection("Training Results");
    print_result(&training_result);
    print_kv("Visited states", &agent.q_table().len().to_string());

    // Greedy evaluation with the learned table
    let training_epsilon = agent.epsilon();
    agent.set_epsilon(agent_config.evaluation_epsilon);
    let mut policy = LearnedPolicy::new(agent, discretizer);
    let evaluation_result = pipeline(
        experiment.evaluation_episodes,
        args.seed.map(|s| s.wrapping_add(1)),
        experiment.max_turns,
        args.progress,
    )
    .evaluate(&mut engine, &mut policy)?;
    print_subsection("Evaluation Results");
    print_kv("Epsilon", &agent_config.evaluation_epsilon.to_string());
    print_result(&evaluation_result);

    let mut agent = policy.into_agent();
    agent.set_epsilon(training_epsilon);

    if let Some(output_path) = &args.output {
        let metadata = TrainingMetadata {
            episodes_trained: Some(training_result.total_episodes),
            opponent: Some(engine.opponent_policy_name().to_string()),
            seed: args.seed,
            evaluation_win_rate: Some(evaluation_result.win_rate),
        };
        let saved = SavedQAgent::new(
            &agent,
            discretizer,
            container.battle_config().clone(),
            metadata,
        );
        saved.save_to_file(output_path)?;
        println!("\n✓ Agent saved to: {}", output_path.display());
        println!("  Stored Q-rows: {}", agent.q_table().len());
    }

    if let Some((summary_path, normalized)) = summary_target {
        if normalized {
            println!(
                "\n⚠️  Normalizing summary path to {}",
                summary_path.display()
            );
        }

        if let Some(parent) = summary_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let summary = TrainingSummaryFile {
            baseline: baseline.as_ref().map(SummaryStats::from),
            training: SummaryStats::from(&training_result),
            evaluation: SummaryStats::from(&evaluation_result),
            metadata: SummaryMetadata {
                learning_rate: agent_config.learning_rate,
                discount_factor: agent_config.discount_factor,
                epsilon: agent_config.epsilon,
                evaluation_epsilon: agent_config.evaluation_epsilon,
                buckets: agent_config.buckets,
                max_turns: experiment.max_turns,
                visited_states: agent.q_table().len(),
                seed: args.seed,
            },
        };

        let file = File::create(&summary_path)?;
        to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}
