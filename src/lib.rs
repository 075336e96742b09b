//! Turn-based battle simulation with a tabular Q-learning agent
//!
//! This crate provides:
//! - A two-combatant battle engine driven as a phase state machine
//! - HP discretization into a finite grid of states
//! - An ε-greedy Q-learning agent with a sparse Q-table
//! - Training and evaluation pipelines with pluggable observers
//! - A `qbattle` CLI for training, evaluating and inspecting agents

pub mod app;
pub mod battle;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;
pub mod utils;

pub use battle::{Action, BattleEngine, Observation, StepOutcome};
pub use error::{Error, Result};
pub use q_learning::{QLearningAgent, StateDiscretizer};
pub use types::StateIndex;
