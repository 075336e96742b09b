//! Decision source port - who picks a combatant's action each turn

use crate::{
    Result,
    battle::{Action, Observation},
};

/// DecisionSource trait - anything that can choose a battle command
///
/// The engine consults a decision source for the opponent every turn; the
/// evaluation pipeline consults one for the controllable combatant. A fixed
/// "always attack" rule, a uniform-random baseline and a learned Q-table
/// policy all sit behind this one interface.
///
/// # Perspective
///
/// `observation` is always given from the deciding combatant's point of
/// view: `controllable_hp` is its own HP and `opponent_hp` the other side's.
pub trait DecisionSource: Send {
    /// Choose the next action.
    ///
    /// # Errors
    ///
    /// Implementations backed by a Q-table may return
    /// [`crate::Error::UnknownState`] if the observation discretizes outside
    /// the table's bounds.
    fn decide(&mut self, observation: Observation) -> Result<Action>;

    /// Name used in reports and logs.
    fn name(&self) -> &str;

    /// Seed the decision source's random number generator, if it has one.
    ///
    /// # Default Implementation
    ///
    /// Does nothing and returns `Ok(())`.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }
}
