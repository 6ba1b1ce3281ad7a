//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RELEVANCE_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::embedding::DevicePreference;

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RELEVANCE_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Calls admitted per caller per window. Default: `1000`.
    pub max_calls_per_window: usize,

    /// Rate-limit window length in seconds. Default: `3600`.
    pub window_secs: u64,

    /// Cached embedding batches kept before eviction. Default: `1000`.
    pub cache_capacity: usize,

    /// Concurrent blocking embedder calls. Default: `4`.
    pub worker_pool_size: usize,

    /// Embedder load attempts per initialization. Default: `3`.
    pub init_retry_count: u32,

    /// Base delay between load attempts (doubles each retry). Default: `1s`.
    pub init_backoff_base: Duration,

    /// Sentence-transformer model directory. `None` selects the stub embedder.
    pub model_path: Option<PathBuf>,

    /// Compute device for the model. Default: `auto`.
    pub device: DevicePreference,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_calls_per_window: 1000,
            window_secs: 3600,
            cache_capacity: 1000,
            worker_pool_size: 4,
            init_retry_count: 3,
            init_backoff_base: Duration::from_millis(1000),
            model_path: None,
            device: DevicePreference::Auto,
        }
    }
}

impl Config {
    const ENV_MAX_CALLS: &'static str = "RELEVANCE_MAX_CALLS";
    const ENV_WINDOW_SECS: &'static str = "RELEVANCE_WINDOW_SECS";
    const ENV_CACHE_CAPACITY: &'static str = "RELEVANCE_CACHE_CAPACITY";
    const ENV_WORKER_POOL_SIZE: &'static str = "RELEVANCE_WORKER_POOL_SIZE";
    const ENV_INIT_RETRY_COUNT: &'static str = "RELEVANCE_INIT_RETRY_COUNT";
    const ENV_INIT_BACKOFF_MS: &'static str = "RELEVANCE_INIT_BACKOFF_MS";
    const ENV_MODEL_PATH: &'static str = "RELEVANCE_MODEL_PATH";
    const ENV_DEVICE: &'static str = "RELEVANCE_DEVICE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_calls_per_window =
            Self::parse_number_from_env(Self::ENV_MAX_CALLS, defaults.max_calls_per_window)?;
        let window_secs = Self::parse_number_from_env(Self::ENV_WINDOW_SECS, defaults.window_secs)?;
        let cache_capacity =
            Self::parse_number_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity)?;
        let worker_pool_size =
            Self::parse_number_from_env(Self::ENV_WORKER_POOL_SIZE, defaults.worker_pool_size)?;
        let init_retry_count =
            Self::parse_number_from_env(Self::ENV_INIT_RETRY_COUNT, defaults.init_retry_count)?;
        let backoff_ms = Self::parse_number_from_env(
            Self::ENV_INIT_BACKOFF_MS,
            defaults.init_backoff_base.as_millis() as u64,
        )?;
        let model_path = Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH);
        let device = Self::parse_device_from_env(defaults.device)?;

        Ok(Self {
            max_calls_per_window,
            window_secs,
            cache_capacity,
            worker_pool_size,
            init_retry_count,
            init_backoff_base: Duration::from_millis(backoff_ms),
            model_path,
            device,
        })
    }

    /// Validates limits and the model path (does not load anything).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (Self::ENV_MAX_CALLS, self.max_calls_per_window as u64),
            (Self::ENV_WINDOW_SECS, self.window_secs),
            (Self::ENV_CACHE_CAPACITY, self.cache_capacity as u64),
            (Self::ENV_WORKER_POOL_SIZE, self.worker_pool_size as u64),
            (Self::ENV_INIT_RETRY_COUNT, u64::from(self.init_retry_count)),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroValue { name: *name });
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Rate-limit window as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr<Err = std::num::ParseIntError>,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidNumber {
                    name: var_name,
                    value: value.clone(),
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_device_from_env(default: DevicePreference) -> Result<DevicePreference, ConfigError> {
        match env::var(Self::ENV_DEVICE) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidDevice { value }),
            Err(_) => Ok(default),
        }
    }
}
