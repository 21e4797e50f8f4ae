use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};
use thiserror::Error;

use crate::utils::write_atomic;

pub const DEFAULT_API_URL: &str = "https://api2.mieung.kr";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub currency_symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.into(),
            currency_symbol: "₩".into(),
            export_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
}

impl ConfigManager {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_path(&self) -> PathBuf {
        self.base.join(CONFIG_FILE)
    }

    /// Falls back to defaults when no file exists; `LEDGER_API_URL` wins over the file.
    pub fn load(&self) -> Result<Config, ConfigError> {
        self.load_with_url(env::var("LEDGER_API_URL").ok())
    }

    fn load_with_url(&self, url_override: Option<String>) -> Result<Config, ConfigError> {
        let path = self.config_path();
        let mut config = if path.exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            Config::default()
        };
        if let Some(url) = url_override {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.config_path(), &json)?;
        Ok(())
    }

    pub fn export_dir(&self, config: &Config) -> PathBuf {
        config
            .export_dir
            .clone()
            .unwrap_or_else(|| self.base.join("exports"))
    }
}
