//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build a desktop dictionary from ri documentation
#[derive(Parser, Debug)]
#[command(name = "rdoc-dictionary")]
#[command(about = "Build a desktop dictionary from ri documentation")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render new entries, then rebuild and install the dictionary if anything changed
    Build {
        /// Rebuild and install even when no new entries were found
        #[arg(short, long)]
        force: bool,

        /// Log every entity as it is rendered
        #[arg(short, long)]
        verbose: bool,

        /// Only process entities matching the quick patterns
        #[arg(short, long)]
        quick: bool,

        /// Delete all cached fragments before running
        #[arg(short, long)]
        delete: bool,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Documentation store directory (can be repeated)
        #[arg(long = "store")]
        stores: Vec<PathBuf>,

        /// Build the bundle but do not install it
        #[arg(long)]
        no_install: bool,
    },

    /// Show version information
    Version,
}
