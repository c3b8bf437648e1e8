//! Archiver library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (load, unload, list)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    engine_client, init_logging, list_archives, load_archive, load_settings, migrator,
    render_result, unload_archive, ArchiveSummary, SettingsOverrides,
};
