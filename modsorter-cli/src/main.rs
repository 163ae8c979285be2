//! modsorter - keep a mod catalog in sync with Modrinth and split mods into
//! client and server directories

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use modsorter_core::SorterConfig;

mod catalog_cli;
mod config_cli;

/// Log levels
#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "modsorter",
    about = "Enrich a mod catalog from Modrinth and sort mods into client and server directories",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Emit structured JSON logs with source locations
    #[clap(long, global = true)]
    trace: bool,

    /// Configuration file (defaults to ./modsorter.yaml, then the user config directory)
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Scan the mods directory, pick up renamed and new archives, and enrich
    Reload,

    /// Look up every catalog row on Modrinth and write the results back
    Enrich,

    /// Enrich, then rebuild the client and server mod directories
    Prepare,

    /// Show the catalog as last written (no network access)
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Back up the catalog and rewrite it sorted by filename
    Save,

    /// Set the Modrinth slug of one catalog row
    Slug {
        /// Archive filename as listed in the catalog
        filename: String,

        /// New slug (empty to clear it)
        slug: String,
    },

    /// Inspect or create the configuration file
    Config {
        #[clap(subcommand)]
        command: config_cli::ConfigCommand,
    },
}

/// Initialize tracing with CLI flags
///
/// Logs always go to stderr so command output on stdout stays clean.
fn initialize_tracing(log_level: &LogLevel, trace: bool) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    if trace {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.trace);

    // Loaded per command so `config init` works before any file exists
    let load = || SorterConfig::load(cli.config.as_deref());

    match cli.command {
        Command::Reload => catalog_cli::execute_reload(&load()?).await,
        Command::Enrich => catalog_cli::execute_enrich(&load()?).await,
        Command::Prepare => catalog_cli::execute_prepare(&load()?).await,
        Command::List { json } => catalog_cli::execute_list(&load()?, json),
        Command::Save => catalog_cli::execute_save(&load()?),
        Command::Slug { filename, slug } => catalog_cli::execute_slug(&load()?, &filename, &slug),
        Command::Config { command } => command.execute(cli.config.as_deref()),
    }
}
