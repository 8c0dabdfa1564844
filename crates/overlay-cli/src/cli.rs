//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Overlay Manager - Inspect and resolve layered entity configuration
#[derive(Parser, Debug)]
#[command(name = "overlay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve the effective configuration for an entity
    ///
    /// Merges the entity's instance entry, its extends-template and the
    /// global defaults, and prints the result.
    ///
    /// Examples:
    ///   overlay resolve alpha                 # From the default source path
    ///   overlay resolve alpha --flat          # As dotted key = value lines
    ///   overlay resolve alpha -c agents.yaml  # From an explicit file
    Resolve {
        /// Entity id to resolve
        entity_id: String,

        /// Path to the overlay source file (defaults to the search path)
        #[arg(short, long, env = "OVERLAY_CONFIG")]
        config: Option<PathBuf>,

        /// Print dotted key = value lines instead of JSON
        #[arg(long)]
        flat: bool,
    },

    /// Flatten a YAML/JSON document to dotted key = value lines
    Flatten {
        /// Document to flatten
        file: PathBuf,
    },

    /// List declared instance ids and template names
    List {
        /// Path to the overlay source file (defaults to the search path)
        #[arg(short, long, env = "OVERLAY_CONFIG")]
        config: Option<PathBuf>,
    },
}
