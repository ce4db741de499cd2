//! Runtime configuration for the content API client and explore feed.
//!
//! # Invariants
//! - `api_base_url` is an http(s) URL without a trailing slash.
//! - Batch size and timeout are non-zero; prefetch percent is in `1..=100`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_RANDOM_BATCH_SIZE: usize = 10;
pub const DEFAULT_PREFETCH_THRESHOLD_PERCENT: u8 = 70;

pub const ENV_API_BASE_URL: &str = "FLASHSTORY_API_BASE_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "FLASHSTORY_HTTP_TIMEOUT_SECS";
pub const ENV_RANDOM_BATCH_SIZE: &str = "FLASHSTORY_RANDOM_BATCH_SIZE";
pub const ENV_PREFETCH_PERCENT: &str = "FLASHSTORY_PREFETCH_PERCENT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid `{key}` value `{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Posts requested per explore fetch.
    pub random_batch_size: usize,
    /// Explore prefetch fires once the reader reaches this share of the buffer.
    pub prefetch_threshold_percent: u8,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            random_batch_size: DEFAULT_RANDOM_BATCH_SIZE,
            prefetch_threshold_percent: DEFAULT_PREFETCH_THRESHOLD_PERCENT,
        }
    }
}

impl CoreConfig {
    /// Builds config from process environment on top of defaults.
    ///
    /// Blank variables are treated as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(url) = read(ENV_API_BASE_URL) {
            config.api_base_url = url;
        }
        if let Some(raw) = read(ENV_HTTP_TIMEOUT_SECS) {
            let secs = parse_number::<u64>(ENV_HTTP_TIMEOUT_SECS, &raw)?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = read(ENV_RANDOM_BATCH_SIZE) {
            config.random_batch_size = parse_number(ENV_RANDOM_BATCH_SIZE, &raw)?;
        }
        if let Some(raw) = read(ENV_PREFETCH_PERCENT) {
            config.prefetch_threshold_percent = parse_number(ENV_PREFETCH_PERCENT, &raw)?;
        }

        config.validate()
    }

    /// Checks invariants and normalizes the base url.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let url = self.api_base_url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: ENV_API_BASE_URL,
                value: self.api_base_url,
                reason: "expected an http:// or https:// url",
            });
        }
        self.api_base_url = url;

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: ENV_HTTP_TIMEOUT_SECS,
                value: "0".to_string(),
                reason: "timeout must be at least one second",
            });
        }
        if self.random_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_RANDOM_BATCH_SIZE,
                value: "0".to_string(),
                reason: "batch size must be positive",
            });
        }
        if !(1..=100).contains(&self.prefetch_threshold_percent) {
            return Err(ConfigError::InvalidValue {
                key: ENV_PREFETCH_PERCENT,
                value: self.prefetch_threshold_percent.to_string(),
                reason: "percent must be within 1..=100",
            });
        }
        Ok(self)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: "expected an unsigned integer",
    })
}
