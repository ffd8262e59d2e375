use std::time::Duration;

use log::warn;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_TABLE: &str = "calculations";
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
    #[error("MILLION_STORE_TIMEOUT_MS must be a positive number of milliseconds, got {0:?}")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    pub table: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub store: Option<StoreConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            store: None,
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match read("PORT") {
            Some(raw) => {
                let parsed = raw.trim().parse::<u16>();
                parsed.map_err(|_| ConfigError::InvalidPort(raw))?
            }
            None => DEFAULT_PORT,
        };

        let timeout = match read("MILLION_STORE_TIMEOUT_MS") {
            Some(raw) => {
                let parsed = raw.trim().parse::<u64>();
                match parsed {
                    Ok(ms) if ms > 0 => Duration::from_millis(ms),
                    _ => return Err(ConfigError::InvalidTimeout(raw)),
                }
            }
            None => Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        };

        let store = match (read("MILLION_STORE_URL"), read("MILLION_STORE_KEY")) {
            (Some(url), Some(api_key)) => Some(StoreConfig {
                url: url.trim().trim_end_matches('/').to_string(),
                api_key,
                table: read("MILLION_STORE_TABLE").unwrap_or_else(|| DEFAULT_STORE_TABLE.into()),
                timeout,
            }),
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    "MILLION_STORE_URL and MILLION_STORE_KEY must both be set; lead persistence disabled"
                );
                None
            }
            (None, None) => None,
        };

        Ok(AppConfig { port, store })
    }
}
