//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: poll forever (default), or a single cycle with --once
//! - check: validate configuration and credentials, then exit

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// homework-bot - reports Practicum homework review status changes to Telegram
#[derive(Parser, Debug)]
#[command(name = "homework-bot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the poll interval in seconds
    #[arg(short, long, global = true)]
    pub interval: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Poll the status endpoint until interrupted
    Run {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Check configuration and credentials without polling
    Check,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run { once: false }
    }
}
