use crate::core::input::normalize_code;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BINANCE_URL: &str = "https://api.binance.com";
pub const DEFAULT_REFERENCE_CURRENCY: &str = "USDT";
const HISTORY_FILE_NAME: &str = "exchange_history.json";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BinanceProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub binance: Option<BinanceProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            binance: Some(BinanceProviderConfig {
                base_url: DEFAULT_BINANCE_URL.to_string(),
            }),
        }
    }
}

fn default_reference_currency() -> String {
    DEFAULT_REFERENCE_CURRENCY.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_reference_currency")]
    pub reference_currency: String,
    pub history_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            reference_currency: default_reference_currency(),
            history_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config at the default location, falling back to built-in
    /// defaults when no config file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.reference_currency = normalize_code(&config.reference_currency);
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn binance_base_url(&self) -> &str {
        self.providers
            .binance
            .as_ref()
            .map_or(DEFAULT_BINANCE_URL, |p| &p.base_url)
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.history_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.data_dir().join(HISTORY_FILE_NAME))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("io", "xrate", "xrate").context("Could not determine project directories")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
reference_currency: "BUSD"
history_path: "/tmp/xrate/history.json"
providers:
  binance:
    base_url: "http://example.com/binance"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.reference_currency, "BUSD");
        assert_eq!(config.binance_base_url(), "http://example.com/binance");
        assert_eq!(
            config.history_path().unwrap(),
            PathBuf::from("/tmp/xrate/history.json")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.reference_currency, "USDT");
        assert_eq!(config.binance_base_url(), DEFAULT_BINANCE_URL);
        assert!(config.history_path.is_none());

        let config: AppConfig =
            serde_yaml::from_str("providers:\n  binance: null\n").expect("Failed to deserialize");
        assert_eq!(config.binance_base_url(), DEFAULT_BINANCE_URL);
    }

    #[test]
    fn test_load_normalizes_reference_currency() {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        fs::write(config_file.path(), "reference_currency: \" usdt \"\n").unwrap();

        let config = AppConfig::load_from_path(config_file.path()).unwrap();
        assert_eq!(config.reference_currency, "USDT");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/nonexistent/xrate/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
