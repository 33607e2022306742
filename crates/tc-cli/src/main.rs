use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tc_cli::commands::{clock, month, segments, today, whoami};
use tc_cli::{Cli, Commands, Config, SegmentsAction};
use tc_core::{Identity, SystemClock};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(tc_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = tc_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Resolve the authenticated identity, failing with a hint if none is set.
fn authenticate(config: &Config) -> Result<Identity> {
    config
        .identity()
        .context("no authenticated user; set `user` in config.toml or TC_USER")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let clock = SystemClock;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Some(Commands::In) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let identity = authenticate(&config)?;
            clock::run_in(&mut out, &mut db, &identity, &clock)?;
        }
        Some(Commands::Out) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let identity = authenticate(&config)?;
            clock::run_out(&mut out, &mut db, &identity, &clock)?;
        }
        Some(Commands::Today { json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let identity = authenticate(&config)?;
            today::run(&mut out, &db, &identity, &clock, json)?;
        }
        Some(Commands::Month {
            year,
            month: month_arg,
            user,
            json,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let identity = authenticate(&config)?;
            month::run(
                &mut out, &db, &identity, &clock, year, month_arg, user, json,
            )?;
        }
        Some(Commands::Segments { action }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let identity = authenticate(&config)?;
            match action {
                SegmentsAction::List {
                    from,
                    to,
                    user,
                    json,
                } => segments::list(&mut out, &db, &identity, from, to, user, json)?,
                SegmentsAction::Show { id } => segments::show(&mut out, &db, &identity, id)?,
                SegmentsAction::Edit {
                    id,
                    start,
                    end,
                    owner,
                } => segments::edit(&mut out, &mut db, &identity, id, start, end, owner)?,
                SegmentsAction::Delete { id } => {
                    segments::delete(&mut out, &mut db, &identity, id)?;
                }
            }
        }
        Some(Commands::Whoami) => {
            let config = Config::load_from(cli.config.as_deref())
                .context("failed to load configuration")?;
            let identity = authenticate(&config)?;
            whoami::run(&mut out, &identity)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
