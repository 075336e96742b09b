//! Configuration types for battles, agents and experiments.
//!
//! Every value here is a plain number (or stat block) with a default taken
//! from the reference scenario; there is no configuration file format. The
//! CLI overrides individual fields through flags.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, battle::CombatantStats, q_learning::state_count_for};

/// The two stat blocks a battle is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Combatant whose action is chosen by the driver
    pub controllable: CombatantStats,
    /// Combatant driven by the engine's decision source
    pub opponent: CombatantStats,
}

impl BattleConfig {
    pub fn validate(&self) -> Result<()> {
        self.controllable.validate()?;
        self.opponent.validate()
    }
}

impl Default for BattleConfig {
    /// Hero (20 HP) against the Demon King (50 HP)
    fn default() -> Self {
        Self {
            controllable: CombatantStats::hero(),
            opponent: CombatantStats::demon_king(),
        }
    }
}

/// Configuration for creating a Q-learning agent.
///
/// # Examples
///
/// ```
/// use qbattle::app::AgentConfig;
///
/// let config = AgentConfig::default()
///     .with_seed(42)
///     .with_epsilon(0.3)
///     .with_buckets(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Step size α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Exploration rate while training
    pub epsilon: f64,
    /// Exploration rate while evaluating
    pub evaluation_epsilon: f64,
    /// Multiplicative decay applied to ε after each training episode
    pub epsilon_decay: f64,
    /// Floor for the decayed ε
    pub min_epsilon: f64,
    /// HP buckets per combatant
    pub buckets: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_evaluation_epsilon(mut self, epsilon: f64) -> Self {
        self.evaluation_epsilon = epsilon;
        self
    }

    /// Enable per-episode ε decay down to `min_epsilon`
    pub fn with_epsilon_decay(mut self, decay: f64, min_epsilon: f64) -> Self {
        self.epsilon_decay = decay;
        self.min_epsilon = min_epsilon;
        self
    }

    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a rate lies outside
    /// `[0, 1]`, `buckets` is zero, or `buckets²` overflows.
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
            ("epsilon", self.epsilon),
            ("evaluation_epsilon", self.evaluation_epsilon),
            ("epsilon_decay", self.epsilon_decay),
            ("min_epsilon", self.min_epsilon),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must lie in [0, 1], got {value}"),
                });
            }
        }
        state_count_for(self.buckets)?;
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.2,
            evaluation_epsilon: 0.0,
            epsilon_decay: 1.0,
            min_epsilon: 0.0,
            buckets: 10,
            seed: None,
        }
    }
}

/// Episode counts for one train-then-evaluate run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub training_episodes: usize,
    pub evaluation_episodes: usize,
    /// Turns after which the driver abandons an episode
    pub max_turns: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            training_episodes: 1000,
            evaluation_episodes: 1000,
            max_turns: 500,
        }
    }
}
