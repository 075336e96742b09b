//! Tabular Q-learning over discretized battle states
//!
//! This module implements one-step Q-learning for the battle environment.
//! Observations (both combatants' HP) are mapped to a bounded state index by
//! [`StateDiscretizer`]; the [`QLearningAgent`] keeps a sparse [`QTable`] of
//! per-action values for the states it has visited.
//!
//! ## Update rule
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α [ r + γ max_a' Q(s',a') − Q(s,a) ]
//! ```
//!
//! Terminal transitions are not masked: the terminal state's row bootstraps
//! from zeros unless that state was visited before.
//!
//! ## Usage Example
//!
//! ```
//! use qbattle::{
//!     app::BattleConfig,
//!     battle::{Action, BattleEngine},
//!     q_learning::{QLearningAgent, StateDiscretizer},
//! };
//!
//! let mut engine = BattleEngine::new(BattleConfig::default())?.with_seed(1);
//! let discretizer = StateDiscretizer::new(10, 20, 50)?;
//! let mut agent = QLearningAgent::new(
//!     0.1, // learning_rate
//!     0.9, // discount_factor
//!     0.2, // epsilon (exploration)
//!     discretizer.state_count(),
//! )
//! .with_seed(2);
//!
//! let mut state = discretizer.discretize(engine.reset());
//! let action = agent.select_action(state, &Action::ALL)?;
//! let outcome = engine.step(action)?;
//! let next_state = discretizer.discretize(outcome.observation);
//! agent.update(state, action, outcome.reward, next_state)?;
//! state = next_state;
//! # let _ = state;
//! # Ok::<(), qbattle::Error>(())
//! ```

pub mod agent;
pub mod discretizer;
pub mod policy;
pub mod q_table;
pub mod serialization;

// Public re-exports
pub use agent::QLearningAgent;
pub use discretizer::{StateDiscretizer, digitize, state_count_for};
pub use policy::LearnedPolicy;
pub use q_table::{QRow, QTable, greedy_action};
pub use serialization::{SavedQAgent, TrainingMetadata};
