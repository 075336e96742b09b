//! Learned decision source backed by a Q-learning agent

use crate::{
    Result,
    battle::{Action, Observation},
    ports::DecisionSource,
    q_learning::{QLearningAgent, StateDiscretizer},
};

/// Acts on a trained Q-table: discretize the observation, then ε-greedy
/// selection with the agent's current ε. No learning happens here.
#[derive(Debug, Clone)]
pub struct LearnedPolicy {
    agent: QLearningAgent,
    discretizer: StateDiscretizer,
    name: String,
}

impl LearnedPolicy {
    pub fn new(agent: QLearningAgent, discretizer: StateDiscretizer) -> Self {
        Self {
            agent,
            discretizer,
            name: "Q-Learning".to_string(),
        }
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    pub fn discretizer(&self) -> &StateDiscretizer {
        &self.discretizer
    }

    /// Give the agent back, e.g. to resume training
    pub fn into_agent(self) -> QLearningAgent {
        self.agent
    }
}

impl DecisionSource for LearnedPolicy {
    fn decide(&mut self, observation: Observation) -> Result<Action> {
        let state = self.discretizer.discretize(observation);
        self.agent.select_action(state, &Action::ALL)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.agent.set_rng_seed(seed);
        Ok(())
    }
}
