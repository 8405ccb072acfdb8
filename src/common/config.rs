//! Configuration management for the federation CLI

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV: &str = "FEDERATION_CLI_CONFIG";

const DEFAULT_FEDERATION_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Connection settings for the federation, persisted as JSON.
///
/// Every key is optional on disk: missing keys take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Base URL of the federation API
    pub federation_url: String,

    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in milliseconds, 0 disables it
    pub timeout: u64,

    /// Default logging level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            federation_url: DEFAULT_FEDERATION_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT_MS,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to the defaults when it is absent
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            CliError::config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?;
        Ok(config_dir.join("federation-cli").join("config.json"))
    }

    /// Resolves the configuration path, honouring an explicit override.
    pub fn resolve_path(explicit: Option<&str>) -> CliResult<PathBuf> {
        match explicit {
            Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).to_string())),
            None => Self::default_config_path(),
        }
    }

    pub fn validate(&self) -> CliResult<()> {
        self.parsed_url()?;
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(CliError::config(format!(
                "Unknown log level '{}' (expected one of {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    pub fn parsed_url(&self) -> CliResult<Url> {
        let url = Url::parse(&self.federation_url).map_err(|e| {
            CliError::config(format!(
                "Invalid federation URL '{}': {}",
                self.federation_url, e
            ))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CliError::config(format!(
                "Federation URL must use http or https, not '{}'",
                other
            ))),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.timeout {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// The API key with all but its last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        match &self.api_key {
            None => "(not set)".to_string(),
            Some(key) if key.chars().count() <= 4 => "****".to_string(),
            Some(key) => {
                let visible: String = key
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("****{}", visible)
            }
        }
    }
}
