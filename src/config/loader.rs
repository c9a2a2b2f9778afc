//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.pregate.toml` in repo root
//! 4. `~/.config/pregate/config.toml` (global defaults)
//! 5. Built-in defaults
//!
//! Network checks are opt-in: each is registered only when its section
//! carries the required endpoints.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants;
use crate::env::Env;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gate: GateConfig,
    pub scan: ScanConfig,
    pub owners: OwnersConfig,
    pub tree: TreeConfig,
    pub try_jobs: TryJobsConfig,
    pub build_queue: BuildQueueConfig,
    pub http: HttpConfig,
}

/// Which description checks the gate runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Require a TESTED= field in the description.
    pub require_tested_field: bool,
    /// Require a QA= field in the description.
    pub require_qa_field: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            require_tested_field: false,
            require_qa_field: false,
        }
    }
}

/// Content-scan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub max_line_length: usize,
    /// License-header regex; the check is registered only when set.
    pub license_pattern: Option<String>,
    pub accept_empty_files: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_line_length: constants::DEFAULT_MAX_LINE_LENGTH,
            license_pattern: None,
            accept_empty_files: true,
        }
    }
}

/// Owners coverage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnersConfig {
    /// Path to the ownership database file; the check is registered
    /// only when set.
    pub file: Option<PathBuf>,
    pub email_pattern: String,
    /// `"prefix"` (historical) or `"exact"`.
    pub self_approval_match: String,
}

impl Default for OwnersConfig {
    fn default() -> Self {
        Self {
            file: None,
            email_pattern: constants::DEFAULT_EMAIL_PATTERN.to_string(),
            self_approval_match: "prefix".to_string(),
        }
    }
}

/// Tree-status endpoint configuration. `json_url` wins over the legacy
/// `url` + `closed_pattern` pair when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub json_url: Option<String>,
    pub url: Option<String>,
    pub closed_pattern: Option<String>,
}

/// Try-job reconciliation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TryJobsConfig {
    /// Platforms that must report success; the check is registered only
    /// when non-empty.
    pub platforms: Vec<String>,
    /// Contact named in escalation messages.
    pub contact: Option<String>,
}

/// Build-queue backlog configuration. Both `max_pending` and `ignored`
/// are mandatory (no implicit default); the check is registered only
/// when the section is complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildQueueConfig {
    pub url: Option<String>,
    pub max_pending: Option<usize>,
    pub ignored: Option<Vec<String>>,
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: constants::DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for
    /// non-default values).
    fn merge(&mut self, other: Config) {
        if other.gate.require_tested_field {
            self.gate.require_tested_field = true;
        }
        if other.gate.require_qa_field {
            self.gate.require_qa_field = true;
        }

        let default_scan = ScanConfig::default();
        if other.scan.max_line_length != default_scan.max_line_length {
            self.scan.max_line_length = other.scan.max_line_length;
        }
        if other.scan.license_pattern.is_some() {
            self.scan.license_pattern = other.scan.license_pattern;
        }
        if other.scan.accept_empty_files != default_scan.accept_empty_files {
            self.scan.accept_empty_files = other.scan.accept_empty_files;
        }

        let default_owners = OwnersConfig::default();
        if other.owners.file.is_some() {
            self.owners.file = other.owners.file;
        }
        if other.owners.email_pattern != default_owners.email_pattern {
            self.owners.email_pattern = other.owners.email_pattern;
        }
        if other.owners.self_approval_match != default_owners.self_approval_match {
            self.owners.self_approval_match = other.owners.self_approval_match;
        }

        if other.tree.json_url.is_some() {
            self.tree.json_url = other.tree.json_url;
        }
        if other.tree.url.is_some() {
            self.tree.url = other.tree.url;
        }
        if other.tree.closed_pattern.is_some() {
            self.tree.closed_pattern = other.tree.closed_pattern;
        }

        if !other.try_jobs.platforms.is_empty() {
            self.try_jobs.platforms = other.try_jobs.platforms;
        }
        if other.try_jobs.contact.is_some() {
            self.try_jobs.contact = other.try_jobs.contact;
        }

        if other.build_queue.url.is_some() {
            self.build_queue.url = other.build_queue.url;
        }
        if other.build_queue.max_pending.is_some() {
            self.build_queue.max_pending = other.build_queue.max_pending;
        }
        if other.build_queue.ignored.is_some() {
            self.build_queue.ignored = other.build_queue.ignored;
        }

        if other.http.timeout_secs != HttpConfig::default().timeout_secs {
            self.http.timeout_secs = other.http.timeout_secs;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.var(constants::ENV_TREE_STATUS_URL) {
            self.tree.json_url = Some(val);
        }
        if let Some(val) = env.var(constants::ENV_HTTP_TIMEOUT) {
            match val.parse::<u64>() {
                Ok(secs) => self.http.timeout_secs = secs,
                Err(_) => eprintln!(
                    "Warning: ignoring invalid {} value: {val}",
                    constants::ENV_HTTP_TIMEOUT,
                ),
            }
        }
    }
}
