//! Time clock CLI library.
//!
//! This crate provides the CLI interface for the time clock.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, SegmentsAction};
pub use config::Config;
