//! Dependency wiring for experiments

use super::config::{AgentConfig, BattleConfig};
use crate::{
    Result,
    battle::BattleEngine,
    q_learning::{QLearningAgent, StateDiscretizer},
};

/// Factory for the objects of one experiment.
///
/// # Examples
///
/// ```
/// use qbattle::app::{AgentConfig, AppContainer, BattleConfig};
///
/// let container = AppContainer::new(BattleConfig::default(), AgentConfig::default().with_seed(7))?;
/// let engine = container.create_engine()?;
/// let agent = container.create_agent()?;
/// assert_eq!(engine.turn_number(), 1);
/// assert_eq!(agent.q_table().len(), 0);
/// # Ok::<(), qbattle::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct AppContainer {
    battle: BattleConfig,
    agent: AgentConfig,
}

impl AppContainer {
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if either configuration
    /// fails validation.
    pub fn new(battle: BattleConfig, agent: AgentConfig) -> Result<Self> {
        battle.validate()?;
        agent.validate()?;
        Ok(Self { battle, agent })
    }

    pub fn battle_config(&self) -> &BattleConfig {
        &self.battle
    }

    pub fn agent_config(&self) -> &AgentConfig {
        &self.agent
    }

    /// Battle engine seeded from the agent seed (offset so the two streams differ)
    pub fn create_engine(&self) -> Result<BattleEngine> {
        let engine = BattleEngine::new(self.battle.clone())?;
        Ok(match self.agent.seed {
            Some(seed) => engine.with_seed(seed.wrapping_add(1)),
            None => engine,
        })
    }

    pub fn create_discretizer(&self) -> Result<StateDiscretizer> {
        StateDiscretizer::new(
            self.agent.buckets,
            self.battle.controllable.max_hp,
            self.battle.opponent.max_hp,
        )
    }

    /// Agent whose Q-table covers every state of [`Self::create_discretizer`]
    pub fn create_agent(&self) -> Result<QLearningAgent> {
        let discretizer = self.create_discretizer()?;
        Ok(QLearningAgent::from_config(&self.agent, discretizer.state_count()))
    }
}
