use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Main configuration structure for vaspflow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Base directories searched when a run handle no longer exists
    #[serde(default)]
    pub run_locations: Vec<PathBuf>,

    /// Results-store credentials source
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Default options for the ingest task
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Settings of synthesized corrective detours
    #[serde(default)]
    pub detour: DetourConfig,

    /// External collaborator commands
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the results-store credentials file lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CredentialsConfig {
    /// Directory holding the credentials file; falls back to `env_var`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Credentials file name inside the directory
    #[serde(default = "default_credentials_file")]
    pub file_name: String,

    /// Environment variable naming the directory when `dir` is unset
    #[serde(default = "default_credentials_env_var")]
    pub env_var: String,
}

fn default_credentials_file() -> String {
    "tasks_db.json".to_string()
}

fn default_credentials_env_var() -> String {
    "DB_LOC".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_name: default_credentials_file(),
            env_var: default_credentials_env_var(),
        }
    }
}

/// Default ingestion options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestionConfig {
    /// Parse the uniform-mesh density of states
    #[serde(default)]
    pub parse_uniform: bool,

    /// Overwrite existing documents for the same run
    #[serde(default)]
    pub update_duplicates: bool,

    /// Extra fields stored with every ingested document
    #[serde(default)]
    pub additional_fields: Map<String, Value>,
}

/// Corrective detour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DetourConfig {
    /// Priority given to both detour nodes
    #[serde(default = "default_detour_priority")]
    pub priority: u32,

    /// Compute nodes requested for the re-ingest node
    #[serde(default = "default_queue_nodes")]
    pub queue_nodes: u32,

    /// Task type of the re-ingest node
    #[serde(default = "default_ingest_task_type")]
    pub ingest_task_type: String,

    /// Duplicate-detection strategy tag attached to the retry node
    #[serde(default = "default_duplicate_strategy")]
    pub duplicate_strategy: String,

    /// Artifacts the retry node copies from the failed run
    #[serde(default = "default_retry_files")]
    pub retry_files: Vec<String>,
}

const fn default_detour_priority() -> u32 {
    4
}

const fn default_queue_nodes() -> u32 {
    1
}

fn default_ingest_task_type() -> String {
    "VASP db insertion".to_string()
}

fn default_duplicate_strategy() -> String {
    "DupeFinderVasp".to_string()
}

fn default_retry_files() -> Vec<String> {
    ["INCAR", "KPOINTS", "POSCAR", "POTCAR", "CONTCAR"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for DetourConfig {
    fn default() -> Self {
        Self {
            priority: default_detour_priority(),
            queue_nodes: default_queue_nodes(),
            ingest_task_type: default_ingest_task_type(),
            duplicate_strategy: default_duplicate_strategy(),
            retry_files: default_retry_files(),
        }
    }
}

/// Command lines (program followed by arguments) of external collaborators
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CommandsConfig {
    /// Assimilates a run directory into the results store
    #[serde(default)]
    pub assimilate: Vec<String>,

    /// Reports whether a primary output artifact is unconverged
    #[serde(default)]
    pub convergence_check: Vec<String>,

    /// Rewrites working inputs before a convergence retry
    #[serde(default)]
    pub handler_setup: Vec<String>,

    /// Runs the corrective simulation
    #[serde(default)]
    pub corrective_run: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_log_rotation(),
        }
    }
}
