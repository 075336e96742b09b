//! Turn-based battle engine
//!
//! The engine runs a five-phase state machine. A single call to
//! [`BattleEngine::step`] walks the phases from `TurnStart` until either the
//! turn has ended or the battle is over:
//!
//! ```text
//! TurnStart -> CommandSelect -> TurnInProgress -+-> TurnEnd -> (return)
//!                                   ^     |     |
//!                                   +-----+     +-> GameEnd -> (return, terminal)
//! ```

use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{
    action::{Action, Side},
    combatant::{Combatant, resolve_action},
    event::{BattleEvent, render_log},
    policy::FixedPolicy,
};
use crate::{
    Error, Result,
    app::BattleConfig,
    ports::{DecisionSource, Environment},
    utils::build_rng,
};

/// Phase of the turn state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattlePhase {
    TurnStart,
    CommandSelect,
    TurnInProgress,
    TurnEnd,
    GameEnd,
}

/// Final result of a battle, from the controllable combatant's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

impl BattleOutcome {
    pub fn reward(self) -> f64 {
        match self {
            BattleOutcome::Victory => 1.0,
            BattleOutcome::Defeat => -1.0,
        }
    }
}

/// Both combatants' current HP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    pub controllable_hp: i32,
    pub opponent_hp: i32,
}

impl Observation {
    pub fn new(controllable_hp: i32, opponent_hp: i32) -> Self {
        Self {
            controllable_hp,
            opponent_hp,
        }
    }

    /// The same observation seen from the other combatant
    pub fn mirrored(self) -> Self {
        Self::new(self.opponent_hp, self.controllable_hp)
    }
}

/// Result of one `step` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub observation: Observation,
    /// 0 unless this call ended the battle, then +1 (victory) or -1 (defeat)
    pub reward: f64,
    pub done: bool,
    /// Everything logged during this turn
    pub events: Vec<BattleEvent>,
}

/// Two-combatant battle environment
pub struct BattleEngine {
    config: BattleConfig,
    controllable: Combatant,
    opponent: Combatant,
    phase: BattlePhase,
    turn: u32,
    acting_order: VecDeque<Side>,
    selected_action: Action,
    opponent_action: Action,
    reward: f64,
    outcome: Option<BattleOutcome>,
    turn_log: Vec<BattleEvent>,
    opponent_policy: Box<dyn DecisionSource>,
    rng: StdRng,
}

impl BattleEngine {
    /// Create an engine at turn 1 with an always-attacking opponent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if either stat block is invalid.
    pub fn new(config: BattleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            controllable: Combatant::new(&config.controllable),
            opponent: Combatant::new(&config.opponent),
            config,
            phase: BattlePhase::TurnStart,
            turn: 1,
            acting_order: VecDeque::with_capacity(2),
            selected_action: Action::Attack,
            opponent_action: Action::Attack,
            reward: 0.0,
            outcome: None,
            turn_log: Vec::new(),
            opponent_policy: Box::new(FixedPolicy::always_attack()),
            rng: build_rng(None),
        })
    }

    /// Seed the turn-order jitter
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replace the opponent's decision source
    pub fn with_opponent_policy(mut self, policy: Box<dyn DecisionSource>) -> Self {
        self.opponent_policy = policy;
        self
    }

    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Reinitialize to turn 1 with both combatants at full HP.
    ///
    /// The random stream and the opponent's decision source carry over.
    pub fn reset(&mut self) -> Observation {
        self.controllable = Combatant::new(&self.config.controllable);
        self.opponent = Combatant::new(&self.config.opponent);
        self.phase = BattlePhase::TurnStart;
        self.turn = 1;
        self.acting_order.clear();
        self.selected_action = Action::Attack;
        self.opponent_action = Action::Attack;
        self.reward = 0.0;
        self.outcome = None;
        self.turn_log.clear();
        self.observation()
    }

    /// Play one full turn with `action` as the controllable combatant's command.
    ///
    /// The whole turn is resolved in this call unless a combatant falls
    /// mid-turn, in which case the battle ends immediately and any remaining
    /// actor loses its action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyTerminated`] if the battle is already over.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome> {
        if self.phase == BattlePhase::GameEnd {
            return Err(Error::AlreadyTerminated);
        }

        self.reward = 0.0;
        loop {
            match self.phase {
                BattlePhase::TurnStart => self.turn_start(),
                BattlePhase::CommandSelect => self.command_select(action)?,
                BattlePhase::TurnInProgress => self.turn_in_progress(),
                BattlePhase::TurnEnd => {
                    self.turn_end();
                    break;
                }
                BattlePhase::GameEnd => {
                    self.game_end();
                    break;
                }
            }
        }

        Ok(StepOutcome {
            observation: self.observation(),
            reward: self.reward,
            done: self.is_done(),
            events: self.turn_log.clone(),
        })
    }

    fn turn_start(&mut self) {
        self.turn_log.clear();
        self.acting_order.clear();
        self.turn_log.push(BattleEvent::TurnStarted { turn: self.turn });
        self.turn_log.push(self.controllable.status());
        self.turn_log.push(self.opponent.status());
        self.phase = BattlePhase::CommandSelect;
    }

    fn command_select(&mut self, action: Action) -> Result<()> {
        self.selected_action = action;
        let observation = self.observation().mirrored();
        self.opponent_action = match self.opponent_policy.decide(observation) {
            Ok(choice) => choice,
            Err(err) => {
                // the turn is replayed from its banner on the next call
                self.turn_log.clear();
                self.phase = BattlePhase::TurnStart;
                return Err(err);
            }
        };

        let mut order = Vec::with_capacity(2);
        for side in [Side::Controllable, Side::Opponent] {
            let jitter: f64 = self.rng.random_range(0.5..1.5);
            order.push((side, f64::from(self.combatant(side).agility) * jitter));
        }
        // fastest first; stable on ties
        order.sort_by(|a, b| b.1.total_cmp(&a.1));
        self.acting_order = order.into_iter().map(|(side, _)| side).collect();

        self.turn_log.push(BattleEvent::CommandSelected { action });
        self.phase = BattlePhase::TurnInProgress;
        Ok(())
    }

    fn turn_in_progress(&mut self) {
        if let Some(side) = self.acting_order.pop_front() {
            let event = match side {
                Side::Controllable => resolve_action(
                    &mut self.controllable,
                    &mut self.opponent,
                    self.selected_action,
                ),
                Side::Opponent => resolve_action(
                    &mut self.opponent,
                    &mut self.controllable,
                    self.opponent_action,
                ),
            };
            self.turn_log.push(event);
        }

        if self.controllable.is_defeated() || self.opponent.is_defeated() {
            self.phase = BattlePhase::GameEnd;
        } else if self.acting_order.is_empty() {
            self.phase = BattlePhase::TurnEnd;
        }
    }

    fn turn_end(&mut self) {
        self.acting_order.clear();
        self.turn += 1;
        self.reward = 0.0;
        self.phase = BattlePhase::TurnStart;
    }

    fn game_end(&mut self) {
        // an actor still queued when the battle ends never acts
        self.acting_order.clear();

        let outcome = if self.controllable.is_defeated() {
            self.turn_log.push(BattleEvent::Defeated {
                name: self.controllable.name.clone(),
            });
            BattleOutcome::Defeat
        } else {
            self.turn_log.push(BattleEvent::Victory {
                name: self.opponent.name.clone(),
            });
            BattleOutcome::Victory
        };
        self.turn_log.push(BattleEvent::GameOver);
        self.reward = outcome.reward();
        self.outcome = Some(outcome);
    }

    fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Controllable => &self.controllable,
            Side::Opponent => &self.opponent,
        }
    }

    /// Current `(controllable_hp, opponent_hp)`
    pub fn observation(&self) -> Observation {
        Observation::new(self.controllable.current_hp, self.opponent.current_hp)
    }

    pub fn is_done(&self) -> bool {
        self.phase == BattlePhase::GameEnd
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Turn currently being played; a finished battle keeps its final turn number
    pub fn turn_number(&self) -> u32 {
        self.turn
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn controllable(&self) -> &Combatant {
        &self.controllable
    }

    pub fn opponent(&self) -> &Combatant {
        &self.opponent
    }

    pub fn opponent_policy_name(&self) -> &str {
        self.opponent_policy.name()
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Status lines for both combatants, controllable first
    pub fn status_lines(&self) -> [String; 2] {
        [self.controllable.status_line(), self.opponent.status_line()]
    }

    /// Events logged during the most recent turn
    pub fn turn_log(&self) -> &[BattleEvent] {
        &self.turn_log
    }

    /// The most recent turn's log as plain text, one line per event
    pub fn render_turn_log(&self) -> String {
        render_log(&self.turn_log)
    }
}

impl Environment for BattleEngine {
    fn reset(&mut self) -> Observation {
        BattleEngine::reset(self)
    }

    fn step(&mut self, action: Action) -> Result<StepOutcome> {
        BattleEngine::step(self, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::CombatantStats;

    fn stats(name: &str, hp: i32, attack: i32, defense: i32, agility: i32) -> CombatantStats {
        CombatantStats {
            name: name.to_string(),
            max_hp: hp,
            attack,
            defense,
            agility,
            intelligence: 5,
        }
    }

    #[test]
    fn test_new_engine_starts_at_turn_one() {
        let engine = BattleEngine::new(BattleConfig::default()).unwrap();
        assert_eq!(engine.turn_number(), 1);
        assert_eq!(engine.phase(), BattlePhase::TurnStart);
        assert_eq!(engine.observation(), Observation::new(20, 50));
        assert!(engine.turn_log().is_empty());
    }

    #[test]
    fn test_step_plays_one_full_turn() {
        let mut engine = BattleEngine::new(BattleConfig::default())
            .unwrap()
            .with_seed(1);
        engine.reset();

        let outcome = engine.step(Action::Attack).unwrap();

        // Hero deals 4 - 2 = 2, Demon King deals 5 - 1 = 4
        assert_eq!(outcome.observation, Observation::new(16, 48));
        assert_eq!(outcome.reward, 0.0);
        assert!(!outcome.done);
        assert_eq!(engine.turn_number(), 2);
        assert_eq!(engine.phase(), BattlePhase::TurnStart);
        assert!(engine.acting_order.is_empty());
    }

    #[test]
    fn test_turn_log_contents() {
        let mut engine = BattleEngine::new(BattleConfig::default())
            .unwrap()
            .with_seed(9);
        engine.reset();

        let outcome = engine.step(Action::Heal).unwrap();
        let events = &outcome.events;

        assert_eq!(events.len(), 6);
        assert_eq!(events[0], BattleEvent::TurnStarted { turn: 1 });
        assert!(matches!(&events[1], BattleEvent::Status { name, .. } if name == "Hero"));
        assert!(matches!(&events[2], BattleEvent::Status { name, .. } if name == "Demon King"));
        assert_eq!(
            events[3],
            BattleEvent::CommandSelected {
                action: Action::Heal
            }
        );
        assert!(events[4..].contains(&BattleEvent::Healed {
            actor: "Hero".to_string(),
            amount: 7,
        }));
        assert!(events[4..].contains(&BattleEvent::Attacked {
            attacker: "Demon King".to_string(),
            target: "Hero".to_string(),
            damage: 4,
        }));
        assert_eq!(engine.turn_log(), events.as_slice());
    }

    #[test]
    fn test_faster_combatant_usually_acts_first() {
        let config = BattleConfig {
            controllable: stats("Fast", 100, 1, 0, 100),
            opponent: stats("Slow", 100, 1, 0, 1),
        };
        let mut engine = BattleEngine::new(config).unwrap().with_seed(5);
        engine.reset();

        for _ in 0..20 {
            let outcome = engine.step(Action::Attack).unwrap();
            assert!(matches!(
                &outcome.events[4],
                BattleEvent::Attacked { attacker, .. } if attacker == "Fast"
            ));
        }
    }

    #[test]
    fn test_victory_ends_mid_turn_and_skips_remaining_actor() {
        let config = BattleConfig {
            controllable: stats("Hero", 30, 10, 0, 100),
            opponent: stats("Slime", 5, 3, 0, 1),
        };
        let mut engine = BattleEngine::new(config).unwrap().with_seed(2);
        engine.reset();

        let outcome = engine.step(Action::Attack).unwrap();

        assert!(outcome.done);
        assert_eq!(outcome.reward, 1.0);
        assert_eq!(outcome.observation, Observation::new(30, 0));
        assert_eq!(engine.outcome(), Some(BattleOutcome::Victory));
        assert_eq!(engine.turn_number(), 1);
        assert!(engine.acting_order.is_empty());
        assert_eq!(outcome.events.last(), Some(&BattleEvent::GameOver));
        assert!(outcome.events.contains(&BattleEvent::Victory {
            name: "Slime".to_string()
        }));
    }

    #[test]
    fn test_defeat_reward_is_negative() {
        let config = BattleConfig {
            controllable: stats("Hero", 3, 1, 0, 1),
            opponent: stats("Dragon", 100, 10, 5, 100),
        };
        let mut engine = BattleEngine::new(config).unwrap().with_seed(4);
        engine.reset();

        let outcome = engine.step(Action::Attack).unwrap();

        assert!(outcome.done);
        assert_eq!(outcome.reward, -1.0);
        assert_eq!(engine.outcome(), Some(BattleOutcome::Defeat));
        assert!(outcome.events.contains(&BattleEvent::Defeated {
            name: "Hero".to_string()
        }));
    }

    #[test]
    fn test_step_after_game_end_fails() {
        let config = BattleConfig {
            controllable: stats("Hero", 30, 10, 0, 100),
            opponent: stats("Slime", 5, 3, 0, 1),
        };
        let mut engine = BattleEngine::new(config).unwrap().with_seed(2);
        engine.reset();
        engine.step(Action::Attack).unwrap();

        assert!(matches!(
            engine.step(Action::Attack),
            Err(Error::AlreadyTerminated)
        ));

        let observation = engine.reset();
        assert_eq!(observation, Observation::new(30, 5));
        assert!(engine.step(Action::Attack).is_ok());
    }

    #[test]
    fn test_same_seed_same_battle() {
        let play = |seed| {
            let mut engine = BattleEngine::new(BattleConfig::default())
                .unwrap()
                .with_seed(seed);
            engine.reset();
            let mut logs = Vec::new();
            loop {
                let outcome = engine.step(Action::Attack).unwrap();
                logs.push(outcome.events);
                if outcome.done {
                    break;
                }
            }
            logs
        };
        assert_eq!(play(17), play(17));
    }

    #[test]
    fn test_opponent_policy_is_consulted() {
        let config = BattleConfig {
            controllable: stats("Hero", 30, 1, 0, 1),
            opponent: stats("Cleric", 30, 9, 0, 1),
        };
        let mut engine = BattleEngine::new(config)
            .unwrap()
            .with_seed(8)
            .with_opponent_policy(Box::new(FixedPolicy::new(Action::Heal)));
        engine.reset();

        let outcome = engine.step(Action::Attack).unwrap();

        assert_eq!(outcome.observation.controllable_hp, 30);
        assert_eq!(engine.opponent_policy_name(), "Always-Heal");
    }

    struct FailOnce {
        failed: bool,
    }

    impl DecisionSource for FailOnce {
        fn decide(&mut self, _observation: Observation) -> Result<Action> {
            if self.failed {
                Ok(Action::Attack)
            } else {
                self.failed = true;
                Err(Error::NoActionsAvailable)
            }
        }

        fn name(&self) -> &str {
            "Fail-Once"
        }
    }

    #[test]
    fn test_opponent_failure_rolls_turn_back() {
        let mut engine = BattleEngine::new(BattleConfig::default())
            .unwrap()
            .with_seed(6)
            .with_opponent_policy(Box::new(FailOnce { failed: false }));
        engine.reset();

        let err = engine.step(Action::Attack).unwrap_err();
        assert!(matches!(err, Error::NoActionsAvailable));
        assert_eq!(engine.phase(), BattlePhase::TurnStart);
        assert_eq!(engine.turn_number(), 1);
        assert!(engine.turn_log().is_empty());
        assert_eq!(engine.observation(), Observation::new(20, 50));

        let outcome = engine.step(Action::Attack).unwrap();
        assert_eq!(outcome.events.len(), 6);
        assert_eq!(outcome.events[0], BattleEvent::TurnStarted { turn: 1 });
        assert_eq!(outcome.observation, Observation::new(16, 48));
    }

    #[test]
    fn test_render_turn_log_joins_lines() {
        let mut engine = BattleEngine::new(BattleConfig::default())
            .unwrap()
            .with_seed(1);
        engine.reset();
        engine.step(Action::Attack).unwrap();

        let rendered = engine.render_turn_log();
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(rendered.ends_with('\n'));
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], " *** Turn 1 ***");
        assert_eq!(lines[1], "[Hero] HP:20/20 ATK:4 DEF:1 AGI:5 INT:7");
        assert_eq!(lines[2], "[Demon King] HP:50/50 ATK:5 DEF:2 AGI:6 INT:3");
        assert_eq!(lines[3], "Command -> Attack");
        assert!(lines[4..].contains(&"Hero dealt 2 damage to Demon King"));
        assert!(lines[4..].contains(&"Demon King dealt 4 damage to Hero"));
    }

    #[test]
    fn test_status_lines() {
        let engine = BattleEngine::new(BattleConfig::default()).unwrap();
        let [hero, demon] = engine.status_lines();
        assert_eq!(hero, "[Hero] HP:20/20 ATK:4 DEF:1 AGI:5 INT:7");
        assert_eq!(demon, "[Demon King] HP:50/50 ATK:5 DEF:2 AGI:6 INT:3");
    }
}
