//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! the episode loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::training::{EpisodeOutcome, EpisodeResult};
use crate::{
    Result,
    battle::{Action, BattleEvent, StepOutcome, render_log},
    ports::Observer,
    utils::rate,
};

/// Observation of a single turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnObservation {
    pub turn: usize,
    pub action: Action,
    pub controllable_hp: i32,
    pub opponent_hp: i32,
    pub reward: f64,
    pub events: Vec<BattleEvent>,
}

/// Complete observation of an episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeObservation {
    pub episode: usize,
    pub result: EpisodeResult,
    pub total_turns: usize,
    pub turns: Vec<TurnObservation>,
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    wins: usize,
    losses: usize,
    truncated: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            wins: 0,
            losses: 0,
            truncated: 0,
        }
    }

    fn message(&self) -> String {
        format!("{} L:{} T:{}", self.wins, self.losses, self.truncated)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (W:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        pb.set_message(self.message());
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, outcome: &EpisodeOutcome) -> Result<()> {
        match outcome.result {
            EpisodeResult::Victory => self.wins += 1,
            EpisodeResult::Defeat => self.losses += 1,
            EpisodeResult::Truncated => self.truncated += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks win/loss counts and episode lengths
#[derive(Debug, Default)]
pub struct MetricsObserver {
    wins: usize,
    losses: usize,
    truncated: usize,
    episode_turns: Vec<usize>,
    total_reward: f64,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_episodes(&self) -> usize {
        self.episode_turns.len()
    }

    pub fn win_rate(&self) -> f64 {
        rate(self.wins, self.total_episodes())
    }

    pub fn loss_rate(&self) -> f64 {
        rate(self.losses, self.total_episodes())
    }

    /// Average episode length in turns
    pub fn avg_episode_length(&self) -> f64 {
        rate(self.episode_turns.iter().sum(), self.episode_turns.len())
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.total_episodes(),
            wins: self.wins,
            losses: self.losses,
            truncated: self.truncated,
            win_rate: self.win_rate(),
            loss_rate: self.loss_rate(),
            avg_episode_length: self.avg_episode_length(),
            total_reward: self.total_reward,
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub truncated: usize,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub avg_episode_length: f64,
    pub total_reward: f64,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, _episode: usize, outcome: &EpisodeOutcome) -> Result<()> {
        match outcome.result {
            EpisodeResult::Victory => self.wins += 1,
            EpisodeResult::Defeat => self.losses += 1,
            EpisodeResult::Truncated => self.truncated += 1,
        }
        self.episode_turns.push(outcome.turns);
        self.total_reward += outcome.total_reward;
        Ok(())
    }
}

/// JSONL observer - Exports every episode's battle log in JSON Lines format
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_turns: Vec<TurnObservation>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self {
            writer,
            current_turns: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.current_turns.clear();
        Ok(())
    }

    fn on_turn(
        &mut self,
        _episode: usize,
        turn: usize,
        action: Action,
        outcome: &StepOutcome,
    ) -> Result<()> {
        self.current_turns.push(TurnObservation {
            turn,
            action,
            controllable_hp: outcome.observation.controllable_hp,
            opponent_hp: outcome.observation.opponent_hp,
            reward: outcome.reward,
            events: outcome.events.clone(),
        });
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, outcome: &EpisodeOutcome) -> Result<()> {
        let observation = EpisodeObservation {
            episode,
            result: outcome.result,
            total_turns: outcome.turns,
            turns: std::mem::take(&mut self.current_turns),
        };

        // Write as JSONL (one JSON object per line)
        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;

        Ok(())
    }
}

/// Battle log observer - Prints each turn's log lines to stdout
#[derive(Debug, Default)]
pub struct BattleLogObserver {
    /// Only the first `limit` episodes are printed
    limit: Option<usize>,
}

impl BattleLogObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, episodes: usize) -> Self {
        self.limit = Some(episodes);
        self
    }

    fn enabled(&self, episode: usize) -> bool {
        self.limit.is_none_or(|limit| episode < limit)
    }
}

impl Observer for BattleLogObserver {
    fn on_turn(
        &mut self,
        episode: usize,
        _turn: usize,
        _action: Action,
        outcome: &StepOutcome,
    ) -> Result<()> {
        if self.enabled(episode) {
            print!("{}", render_log(&outcome.events));
        }
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, outcome: &EpisodeOutcome) -> Result<()> {
        if self.enabled(episode) && outcome.result == EpisodeResult::Truncated {
            println!("(episode stopped after {} turns)", outcome.turns);
        }
        Ok(())
    }
}
