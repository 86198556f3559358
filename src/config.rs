use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder price in dollars per GB per month
pub const DEFAULT_RATE_PER_GB_MONTH: f64 = 1.50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
    pub azure: AzureConfig,
    pub credential: CredentialConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub rate_per_gb_month: f64,
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub management_endpoint: String,
    pub authority_host: String,
    pub api_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub exclude_environment: bool,
    pub exclude_managed_identity: bool,
    pub exclude_azure_cli: bool,
    /// How long to wait for the managed identity endpoint before moving on
    pub imds_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rate_per_gb_month: DEFAULT_RATE_PER_GB_MONTH,
            output: OutputFormat::Text,
        }
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            management_endpoint: "https://management.azure.com".to_string(),
            authority_host: "https://login.microsoftonline.com".to_string(),
            api_version: "2023-04-02".to_string(),
        }
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            exclude_environment: false,
            exclude_managed_identity: false,
            exclude_azure_cli: false,
            imds_timeout_secs: 2,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .zombiedisk.toml in current dir, then ~/.config/zombiedisk/config.toml
            let local = PathBuf::from(".zombiedisk.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("zombiedisk").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".zombiedisk.toml"))
            }
        };

        if !config_path.exists() {
            if path.is_some() {
                tracing::warn!(
                    "Config file not found: {}, using defaults",
                    config_path.display()
                );
            }
            return Ok(Config::default());
        }

        let content =
            std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
                path: config_path.display().to_string(),
                reason: e.to_string(),
            })?;
        let config = Self::from_toml(&content).map_err(|e| {
            let mut err = format!("{}: {}", config_path.display(), e);
            err.push_str("\n  Common issues:");
            err.push_str("\n    - Invalid TOML syntax");
            err.push_str("\n    - Incorrect value types");
            err.push_str("\n    - Unknown output format (use text, json or csv)");
            ConfigError::ParseError(err)
        })?;
        tracing::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
