//! Battle log events
//!
//! Every notable thing that happens during a turn is recorded as a
//! [`BattleEvent`]. The engine hands the events of each turn back to the
//! caller; rendering them is left to observers and the CLI.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::Action;

/// One line of the battle log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BattleEvent {
    /// A new turn begins
    TurnStarted { turn: u32 },
    /// Snapshot of a combatant at the start of a turn
    Status {
        name: String,
        hp: i32,
        max_hp: i32,
        attack: i32,
        defense: i32,
        agility: i32,
        intelligence: i32,
    },
    /// Command chosen for the controllable combatant
    CommandSelected { action: Action },
    /// An attack resolved. `damage` is the uncapped attack-minus-defense value.
    Attacked {
        attacker: String,
        target: String,
        damage: i32,
    },
    /// A heal resolved. `amount` is the uncapped intelligence value.
    Healed { actor: String, amount: i32 },
    /// The controllable combatant was defeated
    Defeated { name: String },
    /// The opponent was defeated
    Victory { name: String },
    /// Final line of every finished battle
    GameOver,
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::TurnStarted { turn } => write!(f, " *** Turn {turn} ***"),
            BattleEvent::Status {
                name,
                hp,
                max_hp,
                attack,
                defense,
                agility,
                intelligence,
            } => write!(
                f,
                "[{name}] HP:{hp}/{max_hp} ATK:{attack} DEF:{defense} AGI:{agility} INT:{intelligence}"
            ),
            BattleEvent::CommandSelected { action } => write!(f, "Command -> {action}"),
            BattleEvent::Attacked {
                attacker,
                target,
                damage,
            } => write!(f, "{attacker} dealt {damage} damage to {target}"),
            BattleEvent::Healed { actor, amount } => write!(f, "{actor} recovered {amount} HP"),
            BattleEvent::Defeated { name } => write!(f, "{name} has fallen"),
            BattleEvent::Victory { name } => write!(f, "{name} was defeated"),
            BattleEvent::GameOver => f.write_str("----- Game Over -----"),
        }
    }
}

/// Render a list of events as newline-terminated log lines
pub fn render_log(events: &[BattleEvent]) -> String {
    events.iter().map(|event| format!("{event}\n")).collect()
}
