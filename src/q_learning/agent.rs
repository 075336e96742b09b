//! Tabular Q-learning agent
//!
//! The agent only sees discretized state indices and actions; it learns
//! from single transitions handed to [`QLearningAgent::update`] by the
//! driver.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    app::AgentConfig,
    battle::Action,
    q_learning::q_table::{QTable, greedy_action},
    types::StateIndex,
    utils::build_rng,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentState {
    pub q_table: QTable,
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    pub initial_epsilon: f64,
    pub epsilon_decay: f64,
    pub min_epsilon: f64,
    pub rng_seed: Option<u64>,
}

/// Q-learning agent (off-policy TD control)
///
/// Learns optimal Q* function by always updating toward the maximum
/// next-state value, regardless of the action actually taken.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    learning_rate: f64,
    discount_factor: f64,
    epsilon: f64,
    initial_epsilon: f64,
    epsilon_decay: f64,
    min_epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl QLearningAgent {
    /// Create a new Q-learning agent
    ///
    /// # Arguments
    ///
    /// * `learning_rate` - α parameter (0.0 to 1.0)
    /// * `discount_factor` - γ parameter (0.0 to 1.0)
    /// * `epsilon` - Exploration rate
    /// * `state_count` - Number of discretized states the table accepts
    pub fn new(learning_rate: f64, discount_factor: f64, epsilon: f64, state_count: usize) -> Self {
        Self {
            q_table: QTable::new(state_count),
            learning_rate,
            discount_factor,
            epsilon,
            initial_epsilon: epsilon,
            epsilon_decay: 1.0,
            min_epsilon: 0.0,
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    pub fn from_config(config: &AgentConfig, state_count: usize) -> Self {
        let agent = Self::new(
            config.learning_rate,
            config.discount_factor,
            config.epsilon,
            state_count,
        )
        .with_epsilon_decay(config.epsilon_decay, config.min_epsilon);
        match config.seed {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_epsilon_decay(mut self, epsilon_decay: f64, min_epsilon: f64) -> Self {
        self.epsilon_decay = epsilon_decay;
        self.min_epsilon = min_epsilon;
        self
    }

    /// ε-greedy action selection
    ///
    /// With probability ε an action is drawn uniformly from `actions`.
    /// Otherwise the highest-valued action is taken, unless the state was
    /// never visited or its row is all zeros; such a row carries no
    /// information, so the agent draws uniformly instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActionsAvailable`] if `actions` is empty and
    /// [`Error::UnknownState`] if `state` is outside the table's bounds.
    pub fn select_action(&mut self, state: StateIndex, actions: &[Action]) -> Result<Action> {
        if actions.is_empty() {
            return Err(Error::NoActionsAvailable);
        }
        let row = self.q_table.row(state)?.copied();

        if self.rng.random::<f64>() < self.epsilon {
            return self.random_action(actions);
        }

        match row {
            Some(row) if row.iter().any(|&q| q != 0.0) => {
                greedy_action(&row, actions).ok_or(Error::NoActionsAvailable)
            }
            _ => self.random_action(actions),
        }
    }

    fn random_action(&mut self, actions: &[Action]) -> Result<Action> {
        actions
            .choose(&mut self.rng)
            .copied()
            .ok_or(Error::NoActionsAvailable)
    }

    /// Apply one Q-learning update with the agent's α and γ.
    ///
    /// Returns the new value of `Q[state][action]`.
    pub fn update(
        &mut self,
        state: StateIndex,
        action: Action,
        reward: f64,
        next_state: StateIndex,
    ) -> Result<f64> {
        self.q_table.q_learning_update(
            state,
            action,
            reward,
            next_state,
            self.discount_factor,
            self.learning_rate,
        )
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Override the exploration rate, e.g. 0 for greedy evaluation
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    /// Decay epsilon after episode
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.min_epsilon);
    }

    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    /// Forget everything learned and restore the initial ε and RNG stream
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.epsilon = self.initial_epsilon;
        self.rng = build_rng(self.rng_seed);
    }

    pub(crate) fn export_state(&self) -> AgentState {
        AgentState {
            q_table: self.q_table.clone(),
            learning_rate: self.learning_rate,
            discount_factor: self.discount_factor,
            epsilon: self.epsilon,
            initial_epsilon: self.initial_epsilon,
            epsilon_decay: self.epsilon_decay,
            min_epsilon: self.min_epsilon,
            rng_seed: self.rng_seed,
        }
    }

    pub(crate) fn from_state(state: AgentState) -> Self {
        Self {
            q_table: state.q_table,
            learning_rate: state.learning_rate,
            discount_factor: state.discount_factor,
            epsilon: state.epsilon,
            initial_epsilon: state.initial_epsilon,
            epsilon_decay: state.epsilon_decay,
            min_epsilon: state.min_epsilon,
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        }
    }
}
