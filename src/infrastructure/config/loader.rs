use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Credentials file name cannot be empty")]
    EmptyCredentialsFileName,

    #[error("Credentials env var cannot be empty when no credentials dir is configured")]
    EmptyCredentialsEnvVar,

    #[error("Invalid detour priority: {0}. Must be at least 1")]
    InvalidDetourPriority(u32),

    #[error("Invalid queue_nodes: {0}. Must be at least 1")]
    InvalidQueueNodes(u32),

    #[error("Detour retry_files cannot be empty")]
    EmptyRetryFiles,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .vaspflow/config.yaml (project config)
    /// 3. .vaspflow/local.yaml (project local overrides, optional)
    /// 4. Environment variables (VASPFLOW_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".vaspflow/config.yaml"))
            .merge(Yaml::file(".vaspflow/local.yaml"))
            .merge(Env::prefixed("VASPFLOW_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring
    /// `VASPFLOW_*` overrides.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("VASPFLOW_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.credentials.file_name.trim().is_empty() {
            return Err(ConfigError::EmptyCredentialsFileName);
        }
        if config.credentials.dir.is_none() && config.credentials.env_var.trim().is_empty() {
            return Err(ConfigError::EmptyCredentialsEnvVar);
        }

        if config.detour.priority == 0 {
            return Err(ConfigError::InvalidDetourPriority(config.detour.priority));
        }
        if config.detour.queue_nodes == 0 {
            return Err(ConfigError::InvalidQueueNodes(config.detour.queue_nodes));
        }
        if config.detour.retry_files.is_empty() {
            return Err(ConfigError::EmptyRetryFiles);
        }
        if config.detour.ingest_task_type.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "detour ingest_task_type cannot be empty".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        for location in &config.run_locations {
            if location.as_os_str().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "run_locations entries cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
