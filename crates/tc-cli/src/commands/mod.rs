//! CLI subcommand implementations.

pub mod clock;
pub mod month;
pub mod segments;
pub mod today;
pub mod whoami;
