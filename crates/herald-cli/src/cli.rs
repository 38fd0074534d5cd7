//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};

use crate::step::Step;

/// Herald - drive and inspect login status flows
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scripted login flow and print every observed event
    ///
    /// Steps: logging, success[:payload], fail[:message], subscribe:<event>
    Simulate {
        /// Steps to run in order
        #[arg(required = true)]
        steps: Vec<Step>,

        /// Output format
        #[arg(short, long, default_value = "table", env = "HERALD_FORMAT")]
        format: OutputFormat,

        /// Number of login results kept in the history
        #[arg(long, env = "HERALD_HISTORY_LIMIT", default_value_t = 16)]
        history_limit: usize,
    },

    /// Print the login state machine transitions
    States,
}

/// Output format for simulation results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
