//! Two-combatant turn-based battle simulator

pub mod action;
pub mod combatant;
pub mod engine;
pub mod event;
pub mod policy;

pub use action::{ACTION_COUNT, Action, Side};
pub use combatant::{Combatant, CombatantStats, resolve_action};
pub use engine::{BattleEngine, BattleOutcome, BattlePhase, Observation, StepOutcome};
pub use event::{BattleEvent, render_log};
pub use policy::{FixedPolicy, RandomPolicy};
