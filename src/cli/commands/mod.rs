//! Subcommands of the `qbattle` binary

pub mod evaluate;
pub mod inspect;
pub mod train;
