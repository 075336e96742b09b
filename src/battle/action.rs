//! Actions and combatant roles

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of actions available to a combatant
pub const ACTION_COUNT: usize = 2;

/// A battle command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Attack,
    Heal,
}

impl Action {
    /// All actions in index order
    pub const ALL: [Action; ACTION_COUNT] = [Action::Attack, Action::Heal];

    /// Position of this action in a Q-value row
    pub fn index(self) -> usize {
        match self {
            Action::Attack => 0,
            Action::Heal => 1,
        }
    }

    /// Look up an action by index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] for any index outside the action set.
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(Error::InvalidAction { index })
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Attack => "Attack",
            Action::Heal => "Heal",
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self> {
        Action::from_index(index)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which of the two combatants an event or decision refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The combatant whose action is supplied to `step`
    Controllable,
    /// The combatant driven by the engine's own decision source
    Opponent,
}
