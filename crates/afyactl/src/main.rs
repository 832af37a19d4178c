//! Afya Control - command-line triage.
//!
//! Front-end for the afya_core rule engine: evaluate patient documents
//! against a rule catalog, list the catalog, validate rule files.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::TriageArgs;
use config::Config;

#[derive(Parser)]
#[command(name = "afyactl")]
#[command(about = "Rule-based medical triage from the command line", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a patient document against the rule catalog
    Triage(TriageArgs),

    /// List the loaded rule catalog
    Rules {
        /// Rules file (JSON); built-in catalog when omitted
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Emit as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a rules file without running a session
    Check {
        /// Rules file (JSON)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref());

    match &cli.command {
        Commands::Triage(args) => commands::triage(args, &config),
        Commands::Rules { rules, json } => commands::rules(rules.as_deref(), *json, &config),
        Commands::Check { file } => commands::check(file),
    }
}
