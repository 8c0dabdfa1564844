//! Overlay Manager CLI
//!
//! Command-line front end for inspecting layered entity configuration:
//! resolve one entity's effective tree, flatten a document to dotted keys,
//! or list the declared instances and templates.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Resolve {
            entity_id,
            config,
            flat,
        }) => commands::run_resolve(&entity_id, config, flat),
        Some(Commands::Flatten { file }) => commands::run_flatten(&file),
        Some(Commands::List { config }) => commands::run_list(config),
        None => {
            // No command provided - show help hint
            println!("{} Overlay Manager CLI", "overlay".green().bold());
            println!();
            println!("Run {} for available commands.", "overlay --help".cyan());
            Ok(())
        }
    }
}
