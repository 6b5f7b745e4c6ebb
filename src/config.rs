//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::provider::DEFAULT_YOUTUBE_BASE_URL;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum age of a cache entry in seconds
    pub cache_max_age: u64,
    /// Maximum number of entries per cache namespace
    pub cache_max_size: usize,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Timeout for a single upstream request in seconds
    pub upstream_timeout: u64,
    /// Base URL of the upstream transcript source
    pub youtube_base_url: String,
    /// Directory with a built front-end to serve, if any
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3001)
    /// - `CACHE_MAX_AGE_SECS` - Maximum entry age (default: 86400)
    /// - `CACHE_MAX_SIZE` - Entries per namespace (default: 1000)
    /// - `SWEEP_INTERVAL_SECS` - Sweep frequency (default: 3600)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream request timeout (default: 10)
    /// - `YOUTUBE_BASE_URL` - Upstream base URL (default: https://www.youtube.com)
    /// - `STATIC_DIR` - Front-end build directory (default: unset)
    ///
    /// Unparseable values fall back to the default; zero intervals are
    /// raised to one second.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env_or("PORT", defaults.server_port),
            cache_max_age: env_or("CACHE_MAX_AGE_SECS", defaults.cache_max_age),
            cache_max_size: env_or("CACHE_MAX_SIZE", defaults.cache_max_size),
            sweep_interval: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval).max(1),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout).max(1),
            youtube_base_url: env::var("YOUTUBE_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.youtube_base_url),
            static_dir: env::var("STATIC_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age)
    }

    pub fn sweep_every(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3001,
            cache_max_age: 24 * 60 * 60,
            cache_max_size: 1000,
            sweep_interval: 60 * 60,
            upstream_timeout: 10,
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
            static_dir: None,
        }
    }
}
