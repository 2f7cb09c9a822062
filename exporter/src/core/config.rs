use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_TIMEOUT_SECS, DEFAULT_URL, ENV_CONFIG, ENV_DATABASE, ENV_NAMING,
    ENV_TIMEOUT_SECS, ENV_URL,
};

// =============================================================================
// Naming Policy Enum
// =============================================================================

/// How point names are derived from view names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingPolicy {
    /// Bare view name
    #[default]
    Plain,
    /// View name plus `.count`, `.histogram` or `.gauge` by aggregation kind
    Suffixed,
}

impl fmt::Display for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingPolicy::Plain => write!(f, "plain"),
            NamingPolicy::Suffixed => write!(f, "suffixed"),
        }
    }
}

impl FromStr for NamingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "suffixed" => Ok(Self::Suffixed),
            other => Err(format!(
                "unknown naming policy '{other}' (expected 'plain' or 'suffixed')"
            )),
        }
    }
}

// =============================================================================
// File Configuration
// =============================================================================

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub url: Option<String>,
    pub database: Option<String>,
    pub naming: Option<NamingPolicy>,
    pub static_tags: Option<BTreeMap<String, String>>,
    pub timeout_secs: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read exporter config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid exporter config {}", path.display()))
    }

    /// Top-level keys that match no exporter setting
    fn unknown_keys(&self) -> Vec<&str> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Exporter Configuration
// =============================================================================

/// Resolved exporter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Base URL of the InfluxDB HTTP API
    pub url: String,
    /// Target database; every batch is bound to it
    pub database: String,
    pub naming: NamingPolicy,
    /// Tags applied to every point, overridden by row tags on collision
    pub static_tags: Option<BTreeMap<String, String>>,
    /// Timeout for a single HTTP write
    pub timeout_secs: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            database: String::new(),
            naming: NamingPolicy::default(),
            static_tags: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl From<FileConfig> for ExporterConfig {
    fn from(file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            url: file.url.unwrap_or(defaults.url),
            database: file.database.unwrap_or(defaults.database),
            naming: file.naming.unwrap_or(defaults.naming),
            static_tags: file.static_tags.filter(|tags| !tags.is_empty()),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}

impl ExporterConfig {
    /// Load configuration with priority (lowest to highest):
    /// 1. Defaults
    /// 2. Config file: `path`, else `$INFLUX_EXPORTER_CONFIG`, else `./influx-exporter.json` if present
    /// 3. Environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as [`ExporterConfig::load`], reading variables through `env`
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        tracing::debug!("Loading exporter configuration");

        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| env(ENV_CONFIG).map(PathBuf::from));

        let config_path = match explicit {
            Some(path) if !path.exists() => {
                anyhow::bail!("Exporter config {} does not exist", path.display())
            }
            Some(path) => Some(path),
            None => Some(PathBuf::from(CONFIG_FILE_NAME)).filter(|local| local.exists()),
        };

        let file_config = match &config_path {
            Some(path) => {
                let file_config = FileConfig::read(path)?;
                let unknown = file_config.unknown_keys();
                if !unknown.is_empty() {
                    tracing::warn!(
                        path = %path.display(),
                        keys = %unknown.join(", "),
                        "Ignoring unknown exporter config keys"
                    );
                }
                file_config
            }
            None => FileConfig::default(),
        };

        let mut config = Self::from(file_config);
        config.apply_env(&env)?;
        config.validate()?;

        tracing::debug!(
            url = %config.url,
            database = %config.database,
            naming = %config.naming,
            "Exporter configuration loaded"
        );
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env(ENV_URL) {
            self.url = url;
        }
        if let Some(database) = env(ENV_DATABASE) {
            self.database = database;
        }
        if let Some(naming) = env(ENV_NAMING) {
            self.naming = naming
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid {ENV_NAMING}: {e}"))?;
        }
        if let Some(timeout) = env(ENV_TIMEOUT_SECS) {
            self.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_TIMEOUT_SECS}: {timeout}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            anyhow::bail!("Configuration error: database must not be empty");
        }

        let url = Url::parse(&self.url)
            .with_context(|| format!("Configuration error: invalid url '{}'", self.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Configuration error: url scheme must be http or https, got '{}'",
                url.scheme()
            );
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("Configuration error: timeout_secs must be greater than 0");
        }

        if let Some(tags) = &self.static_tags
            && tags.keys().any(|k| k.is_empty())
        {
            anyhow::bail!("Configuration error: static_tags keys must not be empty");
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
