//! CLI argument parsing for docsync

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dsync")]
#[command(author, version, about = "Keep the README and progress ledger in sync", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a merged pull request in the ledger and patch the README
    Sync {
        /// Event payload file (defaults to the configured env var)
        #[arg(short, long)]
        event: Option<PathBuf>,

        /// README to patch
        #[arg(short, long)]
        readme: Option<PathBuf>,

        /// Ledger file
        #[arg(long)]
        ledger: Option<PathBuf>,
    },

    /// Regenerate the README from the planning document
    Regen {
        /// Planning document to read
        #[arg(short, long)]
        planning: Option<PathBuf>,

        /// README to overwrite
        #[arg(short, long)]
        readme: Option<PathBuf>,
    },

    /// Show the delta and tag a piece of text would get
    Classify {
        /// Text to classify (joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Show the ledger's current progress and recent history
    Status {
        /// Ledger file
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// History entries to show
        #[arg(short = 'n', long, default_value = "5")]
        entries: usize,
    },
}
