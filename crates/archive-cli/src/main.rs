//! Index archive loader
//!
//! # Usage
//!
//! ```bash
//! archiver load <NAME> [--skip-existing] [--use-create] [--engine-url URL]
//! archiver unload <NAME>
//! archiver list
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/archive-loader/config.toml)
//! 3. Environment variables (ARCHIVER_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use archive_cli::{
    init_logging, list_archives, load_archive, load_settings, render_result, unload_archive, Cli,
    Commands, SettingsOverrides,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut overrides = SettingsOverrides {
        log_level: cli.log_level.clone(),
        ..Default::default()
    };

    match cli.command {
        Commands::Load {
            name,
            skip_existing,
            use_create,
            data_dir,
            engine_url,
            migration_url,
            batch_size,
        } => {
            overrides.data_dir = data_dir;
            overrides.engine_url = engine_url;
            overrides.migration_url = migration_url;
            overrides.batch_size = batch_size;

            let settings = load_settings(cli.config.as_deref(), &overrides)?;
            init_logging(&settings.log_level)?;

            let result = load_archive(&settings, &name, skip_existing, use_create).await?;
            println!("{}", render_result(&result)?);
        }
        Commands::Unload {
            name,
            data_dir,
            engine_url,
        } => {
            overrides.data_dir = data_dir;
            overrides.engine_url = engine_url;

            let settings = load_settings(cli.config.as_deref(), &overrides)?;
            init_logging(&settings.log_level)?;

            let result = unload_archive(&settings, &name).await?;
            println!("{}", render_result(&result)?);
        }
        Commands::List { data_dir } => {
            overrides.data_dir = data_dir;

            let settings = load_settings(cli.config.as_deref(), &overrides)?;
            init_logging(&settings.log_level)?;

            for archive in list_archives(&settings)? {
                println!("{}\t{} files", archive.name, archive.files);
            }
        }
    }

    Ok(())
}
