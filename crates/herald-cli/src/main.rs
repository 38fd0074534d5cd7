//! Herald CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use herald_cli::cli::Cli;
use herald_cli::commands;

fn main() {
    // Load .env.local if it exists (for HERALD_* settings)
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    // Initialize tracing on stderr so JSON output stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = commands::execute(cli.command, &mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
