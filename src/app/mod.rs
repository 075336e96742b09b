//! Application layer: configuration and wiring.
//!
//! [`AppContainer`] turns the plain configuration values into the objects a
//! run needs (engine, discretizer, agent), so the CLI and the tests build
//! them the same way.

pub mod config;
pub mod container;

pub use config::{AgentConfig, BattleConfig, ExperimentConfig};
pub use container::AppContainer;

pub use crate::battle::CombatantStats;
