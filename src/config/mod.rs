//! Configuration module for the Bookshelf backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "./data/bookshelf.sqlite";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// Longest accepted command cache lifetime.
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Longest accepted per-request deadline.
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Shared Redis cache; the in-process cache is used when unset
    pub redis_url: Option<String>,
    /// Lifetime of a cached command map
    pub cache_ttl: Duration,
    /// Deadline applied to store and cache calls of one request
    pub request_timeout: Duration,
    /// Largest accepted bookmark export upload
    pub max_import_bytes: usize,
}

/// A variable was set but could not be parsed.
#[derive(Debug)]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value for {}: {:?}", self.var, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("BOOKSHELF_API_PSK").ok().filter(|k| !k.is_empty());

        let db_path = env::var("BOOKSHELF_DB_PATH")
            .unwrap_or_else(|_| DEFAULT_DB_PATH.to_string())
            .into();

        let bind_addr = parse_var("BOOKSHELF_BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;

        let log_level =
            env::var("BOOKSHELF_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        let redis_url = env::var("BOOKSHELF_REDIS_URL")
            .ok()
            .filter(|url| !url.is_empty());

        let cache_ttl = Duration::from_secs(check_range(
            "BOOKSHELF_CACHE_TTL_SECS",
            parse_var("BOOKSHELF_CACHE_TTL_SECS", Some(DEFAULT_CACHE_TTL_SECS))?,
            1,
            MAX_CACHE_TTL.as_secs(),
        )?);

        let request_timeout = Duration::from_millis(check_range(
            "BOOKSHELF_REQUEST_TIMEOUT_MS",
            parse_var(
                "BOOKSHELF_REQUEST_TIMEOUT_MS",
                Some(DEFAULT_REQUEST_TIMEOUT_MS),
            )?,
            1,
            MAX_REQUEST_TIMEOUT.as_millis() as u64,
        )?);

        let max_import_bytes =
            parse_var("BOOKSHELF_MAX_IMPORT_BYTES", Some(DEFAULT_MAX_IMPORT_BYTES))?;

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            redis_url,
            cache_ttl,
            request_timeout,
            max_import_bytes,
        })
    }
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError { var, value }),
        Err(_) => default.ok_or(ConfigError {
            var,
            value: String::new(),
        }),
    }
}

/// Reject `value` outside `min..=max`.
fn check_range(var: &'static str, value: u64, min: u64, max: u64) -> Result<u64, ConfigError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError {
            var,
            value: value.to_string(),
        })
    }
}
