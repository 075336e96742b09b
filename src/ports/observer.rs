//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training and evaluation
//! runs, allowing composable data collection without coupling the episode
//! loop to specific output formats or metrics.

use crate::{
    Result,
    battle::{Action, StepOutcome},
    pipeline::EpisodeOutcome,
};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during a run.
/// Examples include:
/// - Progress bars for user feedback
/// - JSONL export of battle logs
/// - Win/loss metrics
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_turn(...)` - For each turn played
///    - `on_episode_end(episode, outcome)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use qbattle::{
///     pipeline::EpisodeOutcome,
///     ports::Observer,
/// };
///
/// struct VictoryCounter {
///     victories: usize,
/// }
///
/// impl Observer for VictoryCounter {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         outcome: &EpisodeOutcome,
///     ) -> qbattle::Result<()> {
///         if outcome.is_victory() {
///             self.victories += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when a run starts.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to initialize observation state.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode starts (after the environment reset).
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to reset per-episode state.
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each turn.
    ///
    /// # Parameters
    ///
    /// * `episode` - Index of the current episode (0-based)
    /// * `turn` - Turn number within the episode (1-based)
    /// * `action` - Command given to the controllable combatant
    /// * `outcome` - What the environment returned, including the turn log
    ///
    /// # Default Implementation
    ///
    /// Does nothing.
    fn on_turn(
        &mut self,
        _episode: usize,
        _turn: usize,
        _action: Action,
        _outcome: &StepOutcome,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when an episode ends, either in a terminal state or at the
    /// turn cap.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to record outcomes.
    fn on_episode_end(&mut self, _episode: usize, _outcome: &EpisodeOutcome) -> Result<()> {
        Ok(())
    }

    /// Called when the run completes.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to perform cleanup or final reporting.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
