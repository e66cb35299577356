//! Interactive command console
//!
//! Reads console events from stdin, one per line, and prints the console
//! state to stdout after each.

use anyhow::Result;
use clap::Parser;
use console_repl::{DemoWorld, Driver, ReplConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "console")]
#[command(about = "Interactive command console over a demo world", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, default_value = "console.toml")]
    config: PathBuf,

    /// Maximum number of candidates shown
    #[arg(short, long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ReplConfig::load(&cli.config)?;
    if let Some(limit) = cli.limit {
        config.session.candidate_limit = limit;
        config.validate()?;
    }

    // RUST_LOG wins over --verbose and the config file
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut driver = Driver::new(&config, DemoWorld::new())?;
    driver.run(std::io::stdin().lock(), std::io::stdout().lock())?;

    Ok(())
}
