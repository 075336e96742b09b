//! Training and evaluation pipeline abstractions
//!
//! This module provides the episode loops that drive an [`Environment`]
//! with either a learning agent or a fixed decision source, and the
//! observers that record what happens along the way.

pub mod observers;
pub mod training;

// Re-export observer implementations (adapters)
pub use observers::{
    BattleLogObserver, EpisodeObservation, JsonlObserver, MetricsObserver, MetricsSummary,
    ProgressObserver, TurnObservation,
};
pub use training::{
    EpisodeOutcome, EpisodeResult, TrainingConfig, TrainingPipeline, TrainingResult,
};

pub use crate::ports::{DecisionSource, Environment, Observer};
