//! Ports (trait boundaries) between the domain and its drivers.
//!
//! The battle engine, the learner and the training pipeline only meet
//! through these traits.

pub mod environment;
pub mod observer;
pub mod policy;

pub use environment::Environment;
pub use observer::Observer;
pub use policy::DecisionSource;
