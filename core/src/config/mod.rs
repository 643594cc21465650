use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const TICKERSCOPE_DIR: &str = ".tickerscope";

/// Values pre-filled when `analyze` is run without arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunDefaults {
    pub ticker: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            ticker: "TSLA".to_string(),
            start_date: "2024-01-15T08:00:00.000Z".to_string(),
            end_date: "2025-02-15T07:59:59.999Z".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub anthropic_api_key: String,
    pub anthropic_base_url: Option<String>,
    pub perplexity_api_key: String,
    pub exa_api_key: String,
    pub max_tokens: u32,
    pub max_iterations: usize,
    pub iteration_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub defaults: RunDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: "claude-3-5-sonnet-20241022".to_string(),
            anthropic_api_key: String::new(),
            anthropic_base_url: None,
            perplexity_api_key: String::new(),
            exa_api_key: String::new(),
            max_tokens: 4096,
            max_iterations: 10,
            iteration_delay_ms: 1000,
            request_timeout_secs: 120,
            defaults: RunDefaults::default(),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn iteration_delay(&self) -> Duration {
        Duration::from_millis(self.iteration_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn get_tickerscope_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TICKERSCOPE_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_tickerscope_dir().join("config.toml")
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Config file not found. Run 'tickerscope onboard' to set up your configuration."
            )
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))
}

pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &get_config_path())
}

pub fn save_config_to(config: &Config, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let config = Config {
            anthropic_api_key: "sk-ant".into(),
            max_iterations: 6,
            anthropic_base_url: Some("http://localhost:8080/v1".into()),
            ..Config::default()
        };

        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "max_iterations = 3\n[defaults]\nticker = \"NVDA\"\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.defaults.ticker, "NVDA");
        assert_eq!(config.defaults.start_date, "2024-01-15T08:00:00.000Z");
        assert_eq!(config.iteration_delay(), Duration::from_secs(1));
        assert_eq!(config.model, "claude-3-5-sonnet-20241022");
    }

    #[test]
    fn missing_file_points_to_onboarding() {
        let tmp = TempDir::new().unwrap();
        let err = load_config_from(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("tickerscope onboard"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "max_iterations = \"many\"").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
