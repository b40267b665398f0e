//! simscope CLI
//!
//! Headless driver for similarity exploration sessions.
//!
//! # Commands
//!
//! - `inspect`: corpus summary as JSON
//! - `neighbors`: ranked neighbors of one item
//! - `replay`: apply an event script and print the resulting scene(s)
//! - `demo`: replay a built-in script over the sample corpus
//!
//! Exit code 1 on any error, with remediation hints on stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use simscope_core::config::{Config, LogFormat};
use simscope_core::error::format_error_with_remediation;
use simscope_core::logging::init_logging;

mod commands;

/// simscope - explore similarity in labeled vector corpora
#[derive(Parser)]
#[command(name = "simscope")]
#[command(version)]
#[command(about = "Explore similarity in labeled vector corpora")]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (defaults to <config dir>/simscope/simscope.toml)
    #[arg(long, global = true, env = "SIMSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format override (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a corpus: size, dimension, groups, default neighbor count
    Inspect(commands::CorpusArgs),
    /// Rank the most similar items to one item
    Neighbors(commands::NeighborsArgs),
    /// Apply an event script and print the resulting scene
    ///
    /// The events file is a JSON array such as
    /// `[{"type": "click", "index": 0}, {"type": "set_neighbor_count", "count": 3}]`.
    Replay(commands::ReplayArgs),
    /// Replay a built-in interaction script over the sample corpus
    Demo,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<simscope_core::Error>() {
                Some(core) => eprintln!("{}", format_error_with_remediation(core)),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    config.validate().map_err(simscope_core::Error::from)?;
    init_logging(&config.log_config())?;

    tracing::debug!(command = ?std::env::args().nth(1), "simscope starting");

    match cli.command {
        Commands::Inspect(args) => commands::inspect(&config, &args),
        Commands::Neighbors(args) => commands::neighbors(&config, &args),
        Commands::Replay(args) => commands::replay(&config, &args),
        Commands::Demo => commands::demo(&config),
    }
}
