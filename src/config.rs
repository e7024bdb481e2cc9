//! `config.toml` loading and store construction.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Currency, DEFAULT_PAGE_SIZE, LedgerOptions};
use crate::store::{FileStore, MemoryStore, RecordStore, RestStore, RetryingStore, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    File,
    Rest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Base URL of the REST endpoint.
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub data_dir: PathBuf,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            url: None,
            api_key: None,
            data_dir: PathBuf::from("data"),
            max_retries: 3,
            retry_delay_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub page_size: usize,
    pub default_currency: Currency,
    /// Display every expense in this currency. Unset keeps each expense's own.
    pub expense_currency_override: Option<Currency>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_currency: Currency::Usd,
            expense_currency_override: None,
        }
    }
}

impl LedgerConfig {
    pub fn options(&self) -> LedgerOptions {
        LedgerOptions {
            expense_currency_override: self.expense_currency_override,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(PathBuf),
    Invalid(String),
    Store(StoreError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(path) => write!(f, "{} not found", path.display()),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
            ConfigError::Store(e) => write!(f, "failed to open store: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ConfigError {
    fn from(e: StoreError) -> Self {
        ConfigError::Store(e)
    }
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(data).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.kind == StoreKind::Rest {
            if self.store.url.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::Invalid("store.url is missing".to_string()));
            }
            if self.store.api_key.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::Invalid("store.api_key is missing".to_string()));
            }
        }
        if self.ledger.page_size == 0 {
            return Err(ConfigError::Invalid(
                "ledger.page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.store.retry_delay_ms)
    }

    /// Opens the configured store. Remote and file stores retry transient errors.
    pub fn open_store(&self) -> Result<Box<dyn RecordStore>, ConfigError> {
        let store: Box<dyn RecordStore> = match self.store.kind {
            StoreKind::Memory => Box::new(MemoryStore::new()),
            StoreKind::File => Box::new(RetryingStore::new(
                FileStore::new(&self.store.data_dir),
                self.store.max_retries,
                self.retry_delay(),
            )),
            StoreKind::Rest => {
                let url = self.store.url.clone().unwrap_or_default();
                let key = self.store.api_key.clone().unwrap_or_default();
                Box::new(RetryingStore::new(
                    RestStore::new(url, key)?,
                    self.store.max_retries,
                    self.retry_delay(),
                ))
            }
        };
        Ok(store)
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let data =
        fs::read_to_string(path).map_err(|_| ConfigError::Missing(path.to_path_buf()))?;
    Config::parse(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.ledger.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.ledger.options(), LedgerOptions::default());
    }

    #[test]
    fn rest_store_requires_credentials() {
        let err = Config::parse("[store]\nkind = \"rest\"\nurl = \"https://x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("api_key")));
    }
}
