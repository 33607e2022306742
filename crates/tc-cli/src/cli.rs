//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Time clock for attendance tracking.
///
/// Authenticated users open and close work segments (clock-in/clock-out)
/// and query daily and monthly totals.
#[derive(Debug, Parser)]
#[command(name = "tc", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clock in: open a new work segment.
    In,

    /// Clock out: close your open work segment.
    Out,

    /// Show today's segments and totals.
    Today {
        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show a monthly summary.
    Month {
        /// Year to summarize (default: current year).
        #[arg(long)]
        year: Option<i32>,

        /// Month to summarize, 1-12 (default: current month).
        #[arg(long)]
        month: Option<u32>,

        /// Summarize another user's segments (privileged roles only).
        #[arg(long)]
        user: Option<String>,

        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Inspect and manage stored segments.
    Segments {
        #[command(subcommand)]
        action: SegmentsAction,
    },

    /// Show the identity this invocation runs as.
    Whoami,
}

/// Segment management subcommands.
#[derive(Debug, Subcommand)]
pub enum SegmentsAction {
    /// List segments in scope, newest first.
    List {
        /// Earliest date to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,

        /// Latest date to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,

        /// Restrict to one user (privileged roles only).
        #[arg(long)]
        user: Option<String>,

        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show one segment.
    Show {
        /// Segment id.
        id: i64,
    },

    /// Edit a segment's times, or reassign its owner.
    Edit {
        /// Segment id.
        id: i64,

        /// New start time (HH:MM or HH:MM:SS).
        #[arg(long)]
        start: Option<String>,

        /// New end time (HH:MM or HH:MM:SS).
        #[arg(long)]
        end: Option<String>,

        /// New owner (privileged roles only; silently ignored for workers).
        #[arg(long)]
        owner: Option<String>,
    },

    /// Delete a segment.
    Delete {
        /// Segment id.
        id: i64,
    },
}
