//! Serialization support for trained Q-learning agents.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{
    app::BattleConfig,
    q_learning::{
        StateDiscretizer,
        agent::{AgentState, QLearningAgent},
    },
};

/// Provenance recorded alongside a saved agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Number of training episodes
    pub episodes_trained: Option<usize>,
    /// Opponent decision source trained against
    pub opponent: Option<String>,
    /// Random seed used (if any)
    pub seed: Option<u64>,
    /// Win rate of the greedy evaluation that followed training
    pub evaluation_win_rate: Option<f64>,
}

/// A Q-learning agent together with everything needed to replay it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQAgent {
    pub version: u32,
    state: AgentState,
    pub discretizer: StateDiscretizer,
    pub battle: BattleConfig,
    pub metadata: TrainingMetadata,
}

impl SavedQAgent {
    pub const VERSION: u32 = 1;

    pub fn new(
        agent: &QLearningAgent,
        discretizer: StateDiscretizer,
        battle: BattleConfig,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            version: Self::VERSION,
            state: agent.export_state(),
            discretizer,
            battle,
            metadata,
        }
    }

    pub fn to_agent(&self) -> Result<QLearningAgent> {
        if self.version != Self::VERSION {
            return Err(anyhow!(
                "Unsupported agent save format version: {}. Expected {}",
                self.version,
                Self::VERSION
            ));
        }
        if self.state.q_table.state_count() != self.discretizer.state_count() {
            return Err(anyhow!(
                "Saved Q-table covers {} states but the discretizer produces {}",
                self.state.q_table.state_count(),
                self.discretizer.state_count()
            ));
        }
        Ok(QLearningAgent::from_state(self.state.clone()))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).context("Failed to serialize agent")?;
        writer.flush().context("Failed to flush agent file")?;

        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize agent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{battle::Action, types::StateIndex};

    fn trained_agent() -> (QLearningAgent, StateDiscretizer) {
        let discretizer = StateDiscretizer::new(10, 20, 50).unwrap();
        let mut agent = QLearningAgent::new(0.1, 0.9, 0.2, discretizer.state_count()).with_seed(7);
        agent
            .update(StateIndex::new(99), Action::Attack, 0.0, StateIndex::new(98))
            .unwrap();
        agent
            .update(StateIndex::new(98), Action::Heal, 1.0, StateIndex::new(0))
            .unwrap();
        (agent, discretizer)
    }

    #[test]
    fn test_roundtrip() -> Result<()> {
        let (agent, discretizer) = trained_agent();
        let metadata = TrainingMetadata {
            episodes_trained: Some(10),
            seed: Some(7),
            ..TrainingMetadata::default()
        };

        let saved = SavedQAgent::new(&agent, discretizer, BattleConfig::default(), metadata);
        let bytes = rmp_serde::to_vec(&saved)?;
        let loaded: SavedQAgent = rmp_serde::from_slice(&bytes)?;
        let restored = loaded.to_agent()?;

        assert_eq!(restored.q_table().len(), agent.q_table().len());
        assert_eq!(
            restored.q_table().get(StateIndex::new(98), Action::Heal)?,
            agent.q_table().get(StateIndex::new(98), Action::Heal)?
        );
        assert_eq!(loaded.metadata.episodes_trained, Some(10));
        Ok(())
    }

    #[test]
    fn test_file_roundtrip() -> Result<()> {
        let (agent, discretizer) = trained_agent();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("agent.msgpack");

        SavedQAgent::new(
            &agent,
            discretizer,
            BattleConfig::default(),
            TrainingMetadata::default(),
        )
        .save_to_file(&path)?;
        let loaded = SavedQAgent::load_from_file(&path)?;

        assert_eq!(loaded.discretizer, discretizer);
        assert_eq!(loaded.to_agent()?.q_table().len(), 3);
        Ok(())
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let (agent, discretizer) = trained_agent();
        let mut saved = SavedQAgent::new(
            &agent,
            discretizer,
            BattleConfig::default(),
            TrainingMetadata::default(),
        );
        saved.version = 99;
        assert!(saved.to_agent().is_err());
    }
}
