//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod inspect;
pub mod process;
