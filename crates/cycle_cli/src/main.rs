//! `cycle-tracker` entry point.
//!
//! # Responsibility
//! - Parse flags, load configuration and start file logging.
//! - Hand stdin/stdout to the interactive session.

mod report;
mod session;

use clap::Parser;
use cycle_core::{init_logging, Config};
use session::SessionOptions;
use std::error::Error;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cycle-tracker", version)]
#[command(about = "Records period dates and estimates the next cycle", long_about = None)]
struct Cli {
    /// Delete the most recently added period instead of showing the menu
    #[arg(long = "removelast")]
    remove_last: bool,

    /// Override the period database path
    #[arg(long)]
    db: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level for the log file (trace, debug, info, warn, error, off)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    if let Some(log_dir) = &config.logging.dir {
        // Logging is diagnostics only; the session runs without it.
        if let Err(err) = init_logging(&level, log_dir) {
            eprintln!("warning: file logging disabled: {err}");
        }
    }

    let options = SessionOptions {
        db_path: cli.db.unwrap_or_else(|| config.storage.path.clone()),
        remove_last: cli.remove_last,
        policies: config.policies(),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    session::run(&mut stdin.lock(), &mut stdout.lock(), &options)?;
    Ok(())
}
