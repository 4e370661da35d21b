//! Configuration loader
//!
//! Loads SDK configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `APPCHAINS_CHAINS_URL`: Chains job-service base URL (required)
//! - `APPCHAINS_BEACONS_URL`: Beacon service base URL
//! - `APPCHAINS_TOKEN`: OAuth bearer token
//! - `APPCHAINS_POLL_INTERVAL_MS`: Wait between poll rounds
//! - `APPCHAINS_POLL_DEADLINE_MS`: Optional bound on one poll call
//! - `APPCHAINS_HTTP_TIMEOUT_SECS`: Per-request timeout
//! - `APPCHAINS_HTTP_ATTEMPTS`: Transport attempt budget
//! - `APPCHAINS_HTTP_BACKOFF_MS`: Base backoff between transport retries
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./appchains.toml` or `./appchains.json`
//! 2. `./config.toml` or `./config.json`
//! 3. The same names in the parent directory

use std::path::{Path, PathBuf};

use appchains_domain::{AppChainsError, ChainsConfig, HttpConfig, PollConfig, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `AppChainsError::Config` if configuration cannot be loaded
/// from either source.
pub fn load() -> Result<ChainsConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `APPCHAINS_CHAINS_URL` must be present; everything else falls back to
/// its default.
///
/// # Errors
/// Returns `AppChainsError::Config` if the required variable is missing
/// or a numeric variable has an invalid value.
pub fn load_from_env() -> Result<ChainsConfig> {
    let chains_url = env_var("APPCHAINS_CHAINS_URL")?;
    let beacons_url = std::env::var("APPCHAINS_BEACONS_URL")
        .unwrap_or_else(|_| appchains_domain::constants::DEFAULT_BEACONS_URL.to_string());
    let token = std::env::var("APPCHAINS_TOKEN").ok();

    let mut poll = PollConfig::default();
    if let Some(interval) = env_parse::<u64>("APPCHAINS_POLL_INTERVAL_MS")? {
        poll.interval_ms = interval;
    }
    poll.deadline_ms = env_parse::<u64>("APPCHAINS_POLL_DEADLINE_MS")?;

    let mut http = HttpConfig::default();
    if let Some(timeout) = env_parse::<u64>("APPCHAINS_HTTP_TIMEOUT_SECS")? {
        http.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse::<usize>("APPCHAINS_HTTP_ATTEMPTS")? {
        http.max_attempts = attempts;
    }
    if let Some(backoff) = env_parse::<u64>("APPCHAINS_HTTP_BACKOFF_MS")? {
        http.base_backoff_ms = backoff;
    }

    Ok(ChainsConfig { chains_url, beacons_url, token, poll, http })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports both
/// JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `AppChainsError::Config` if no file is found, the format is
/// invalid, or required fields are missing.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ChainsConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AppChainsError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AppChainsError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AppChainsError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, dispatching on extension.
fn parse_config(contents: &str, path: &Path) -> Result<ChainsConfig> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(contents)
            .map_err(|e| AppChainsError::Config(format!("Invalid JSON config: {e}"))),
        Some("toml") => toml::from_str(contents)
            .map_err(|e| AppChainsError::Config(format!("Invalid TOML config: {e}"))),
        other => Err(AppChainsError::Config(format!(
            "Unsupported config format: {}",
            other.unwrap_or("<none>")
        ))),
    }
}

/// Probe the standard config file locations, first hit wins.
fn probe_config_paths() -> Option<PathBuf> {
    let names = ["appchains.toml", "appchains.json", "config.toml", "config.json"];
    let bases = [PathBuf::from("."), PathBuf::from("..")];

    for base in &bases {
        for name in &names {
            let candidate = base.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| AppChainsError::Config(format!("Missing environment variable: {name}")))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppChainsError::Config(format!("Invalid value for {name}: {e}"))),
        Err(_) => Ok(None),
    }
}
