//! Environment port - the reset/step contract the agent trains against

use crate::{
    Result,
    battle::{Action, Observation, StepOutcome},
};

/// Episodic environment driven one decision at a time
///
/// Learners and pipelines only see this contract, never the engine's
/// internals, so any environment with the same observation and action
/// space can be trained against.
pub trait Environment {
    /// Start a new episode and return the initial observation.
    fn reset(&mut self) -> Observation;

    /// Advance the episode by one decision.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AlreadyTerminated`] when called after an
    /// outcome with `done == true` and before the next [`Environment::reset`].
    fn step(&mut self, action: Action) -> Result<StepOutcome>;
}
