//! CLI argument parsing for the archiver.
//!
//! Flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Index archive loader
///
/// Replays archived indices and documents into a search engine.
#[derive(Parser, Debug)]
#[command(name = "archiver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/archive-loader/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Archiver commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load an archive into the engine
    Load {
        /// Archive name (directory under the data dir)
        name: String,

        /// Leave indices that already exist untouched
        #[arg(long)]
        skip_existing: bool,

        /// Write documents with `create`, never overwriting
        #[arg(long)]
        use_create: bool,

        /// Override archive data directory
        #[arg(long)]
        data_dir: Option<String>,

        /// Override engine URL
        #[arg(long)]
        engine_url: Option<String>,

        /// Override migration base URL
        #[arg(long)]
        migration_url: Option<String>,

        /// Override documents per bulk request
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Delete the indices an archive describes
    Unload {
        /// Archive name (directory under the data dir)
        name: String,

        /// Override archive data directory
        #[arg(long)]
        data_dir: Option<String>,

        /// Override engine URL
        #[arg(long)]
        engine_url: Option<String>,
    },

    /// List available archives
    List {
        /// Override archive data directory
        #[arg(long)]
        data_dir: Option<String>,
    },
}
