//! Combatants and action resolution

use serde::{Deserialize, Serialize};

use super::{action::Action, event::BattleEvent};
use crate::{Error, Result};

/// Fixed stat block a combatant is created from at every reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantStats {
    pub name: String,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub agility: i32,
    pub intelligence: i32,
}

impl CombatantStats {
    /// Reference controllable combatant
    pub fn hero() -> Self {
        Self {
            name: "Hero".to_string(),
            max_hp: 20,
            attack: 4,
            defense: 1,
            agility: 5,
            intelligence: 7,
        }
    }

    /// Reference opponent
    pub fn demon_king() -> Self {
        Self {
            name: "Demon King".to_string(),
            max_hp: 50,
            attack: 5,
            defense: 2,
            agility: 6,
            intelligence: 3,
        }
    }

    /// Check that the stat block can produce a valid combatant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `max_hp` is not positive.
    pub fn validate(&self) -> Result<()> {
        if self.max_hp <= 0 {
            return Err(Error::InvalidConfiguration {
                message: format!("{} must have positive max HP, got {}", self.name, self.max_hp),
            });
        }
        Ok(())
    }
}

/// A combatant taking part in a battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub current_hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub agility: i32,
    pub intelligence: i32,
}

impl Combatant {
    /// Create a combatant at full health
    pub fn new(stats: &CombatantStats) -> Self {
        Self {
            name: stats.name.clone(),
            current_hp: stats.max_hp,
            max_hp: stats.max_hp,
            attack: stats.attack,
            defense: stats.defense,
            agility: stats.agility,
            intelligence: stats.intelligence,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp <= 0
    }

    /// Status event for the turn log
    pub fn status(&self) -> BattleEvent {
        BattleEvent::Status {
            name: self.name.clone(),
            hp: self.current_hp,
            max_hp: self.max_hp,
            attack: self.attack,
            defense: self.defense,
            agility: self.agility,
            intelligence: self.intelligence,
        }
    }

    /// Human-readable status line
    pub fn status_line(&self) -> String {
        self.status().to_string()
    }

    fn clamp_hp(&mut self) {
        self.current_hp = self.current_hp.clamp(0, self.max_hp);
    }
}

/// Resolve `action` taken by `actor` against `target`.
///
/// Attack damage is `actor.attack - target.defense` without a zero floor, and
/// the applied amount is capped at the target's remaining HP. Heal restores
/// `actor.intelligence`, capped at the actor's missing HP. The returned event
/// always carries the uncapped value.
pub fn resolve_action(
    actor: &mut Combatant,
    target: &mut Combatant,
    action: Action,
) -> BattleEvent {
    match action {
        Action::Attack => {
            let damage = actor.attack - target.defense;
            let applied = damage.min(target.current_hp);
            target.current_hp -= applied;
            // a negative damage value heals the target; keep it under max HP
            target.clamp_hp();
            BattleEvent::Attacked {
                attacker: actor.name.clone(),
                target: target.name.clone(),
                damage,
            }
        }
        Action::Heal => {
            let amount = actor.intelligence;
            let applied = amount.min(actor.max_hp - actor.current_hp);
            actor.current_hp += applied;
            actor.clamp_hp();
            BattleEvent::Healed {
                actor: actor.name.clone(),
                amount,
            }
        }
    }
}
