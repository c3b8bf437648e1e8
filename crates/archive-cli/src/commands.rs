//! Command implementations for the archiver.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use archive_engine::{
    EngineClient, EngineClientConfig, HttpEngineClient, HttpMigrator, Migrator, MigratorConfig,
};
use archive_loader::{load, unload, LoadRequest, LoadResult};
use archive_reader::list_archive_files;
use archive_types::Settings;

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub data_dir: Option<String>,
    pub engine_url: Option<String>,
    pub migration_url: Option<String>,
    pub batch_size: Option<usize>,
    pub log_level: Option<String>,
}

impl SettingsOverrides {
    /// Apply every override that was given.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(data_dir) = &self.data_dir {
            settings.data_dir = data_dir.clone();
        }
        if let Some(url) = &self.engine_url {
            settings.engine_url = url.clone();
        }
        if let Some(url) = &self.migration_url {
            settings.migration_url = url.clone();
        }
        if let Some(size) = self.batch_size {
            settings.batch_size = size;
        }
        if let Some(level) = &self.log_level {
            settings.log_level = level.clone();
        }
    }
}

/// Load configuration and apply CLI overrides on top.
pub fn load_settings(config_path: Option<&str>, overrides: &SettingsOverrides) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    overrides.apply(&mut settings);
    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays parseable.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn timeout(settings: &Settings) -> Duration {
    Duration::from_secs(settings.request_timeout_secs)
}

/// Engine client for the configured engine URL.
pub fn engine_client(settings: &Settings) -> Result<Arc<dyn EngineClient>> {
    let config = EngineClientConfig::new(&settings.engine_url).with_timeout(timeout(settings));
    let client = HttpEngineClient::new(config).context("Failed to create engine client")?;
    Ok(Arc::new(client))
}

/// Migration trigger for the configured application URL.
pub fn migrator(settings: &Settings) -> Result<Arc<dyn Migrator>> {
    let mut config = MigratorConfig::new(&settings.migration_url, &settings.migration_path);
    config.timeout = timeout(settings);
    let migrator = HttpMigrator::new(config).context("Failed to create migrator")?;
    Ok(Arc::new(migrator))
}

/// Load an archive against the configured engine.
pub async fn load_archive(
    settings: &Settings,
    name: &str,
    skip_existing: bool,
    use_create: bool,
) -> Result<LoadResult> {
    let request = LoadRequest::from_settings(name, settings)
        .with_skip_existing(skip_existing)
        .with_use_create(use_create);

    info!(
        archive = %name,
        engine = %settings.engine_url,
        dir = ?request.archive_dir(),
        "Starting load"
    );

    load(&request, engine_client(settings)?, migrator(settings)?)
        .await
        .with_context(|| format!("Failed to load archive {name}"))
}

/// Unload an archive from the configured engine.
pub async fn unload_archive(settings: &Settings, name: &str) -> Result<LoadResult> {
    let request = LoadRequest::from_settings(name, settings);

    unload(&request, engine_client(settings)?)
        .await
        .with_context(|| format!("Failed to unload archive {name}"))
}

/// One archive found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub name: String,
    pub files: usize,
}

/// Archives in the data directory with their file counts.
pub fn list_archives(settings: &Settings) -> Result<Vec<ArchiveSummary>> {
    let data_dir = settings.expanded_data_dir();
    let names = archive_reader::list_archives(&data_dir)
        .with_context(|| format!("Failed to list archives in {}", data_dir.display()))?;

    names
        .into_iter()
        .map(|name| -> Result<ArchiveSummary> {
            let files = list_archive_files(&data_dir.join(&name))
                .with_context(|| format!("Failed to read archive {name}"))?
                .len();
            Ok(ArchiveSummary { name, files })
        })
        .collect()
}

/// Render a result for stdout.
pub fn render_result(result: &LoadResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize result")
}
