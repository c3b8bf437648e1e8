//! Configuration loading for the archive loader.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/archive-loader/config.toml`
//! (platform equivalent via `directories`).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default number of documents per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default number of records buffered between the reader and the pipeline.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default name prefix of the platform's internal metadata indices.
pub const DEFAULT_INTERNAL_INDEX_PREFIX: &str = ".kibana";

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding one sub-directory per archive
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Base URL of the destination search engine
    #[serde(default = "default_engine_url")]
    pub engine_url: String,

    /// Base URL of the application that runs index migrations
    #[serde(default = "default_migration_url")]
    pub migration_url: String,

    /// Path appended to `migration_url` to trigger a migration
    #[serde(default = "default_migration_path")]
    pub migration_path: String,

    /// Documents per bulk request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Records buffered between the file reader and the pipeline
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Indices whose name starts with this prefix trigger a migration
    #[serde(default = "default_internal_index_prefix")]
    pub internal_index_prefix: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> String {
    ProjectDirs::from("", "", "archive-loader")
        .map(|p| p.data_local_dir().join("archives"))
        .unwrap_or_else(|| PathBuf::from("./archives"))
        .to_string_lossy()
        .to_string()
}

fn default_engine_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_migration_url() -> String {
    "http://localhost:5601".to_string()
}

fn default_migration_path() -> String {
    "/internal/migrations/_run".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_internal_index_prefix() -> String {
    DEFAULT_INTERNAL_INDEX_PREFIX.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            engine_url: default_engine_url(),
            migration_url: default_migration_url(),
            migration_path: default_migration_path(),
            batch_size: default_batch_size(),
            channel_capacity: default_channel_capacity(),
            internal_index_prefix: default_internal_index_prefix(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/archive-loader/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (ARCHIVER_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "archive-loader")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("data_dir", default_data_dir())?
            .set_default("engine_url", default_engine_url())?
            .set_default("migration_url", default_migration_url())?
            .set_default("migration_path", default_migration_path())?
            .set_default("batch_size", default_batch_size() as i64)?
            .set_default("channel_capacity", default_channel_capacity() as i64)?
            .set_default("internal_index_prefix", default_internal_index_prefix())?
            .set_default("request_timeout_secs", default_request_timeout_secs() as i64)?
            .set_default("log_level", default_log_level())?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ARCHIVER_ENGINE_URL, ARCHIVER_BATCH_SIZE, ...
        builder = builder.add_source(
            Environment::with_prefix("ARCHIVER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be > 0".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel_capacity must be > 0".to_string(),
            ));
        }
        if self.engine_url.trim().is_empty() {
            return Err(ConfigError::Invalid("engine_url must be set".to_string()));
        }
        Ok(())
    }

    /// Expand `~` in `data_dir` to the home directory.
    pub fn expanded_data_dir(&self) -> PathBuf {
        if let Some(rest) = self.data_dir.strip_prefix("~/") {
            if let Some(dirs) = directories::BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.data_dir)
    }

    /// Directory of one named archive.
    pub fn archive_dir(&self, name: &str) -> PathBuf {
        self.expanded_data_dir().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.engine_url, "http://localhost:9200");
        assert_eq!(settings.batch_size, 500);
        assert_eq!(settings.internal_index_prefix, ".kibana");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert!(settings.batch_size > 0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archiver.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "engine_url = \"http://search:9200\"").unwrap();
        writeln!(file, "batch_size = 42").unwrap();
        drop(file);

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.engine_url, "http://search:9200");
        assert_eq!(settings.batch_size, 42);
        assert_eq!(settings.migration_path, "/internal/migrations/_run");
    }

    #[test]
    fn test_missing_cli_config_is_error() {
        let result = Settings::load(Some("/nonexistent/archiver.toml"));
        assert!(matches!(result, Err(ConfigError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        settings.batch_size = 0;
        assert!(settings.validate().is_err());

        settings.batch_size = 10;
        settings.channel_capacity = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_archive_dir() {
        let settings = Settings {
            data_dir: "/srv/archives".to_string(),
            ..Default::default()
        };
        assert_eq!(
            settings.archive_dir("logstash"),
            PathBuf::from("/srv/archives/logstash")
        );
    }
}
