//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{ListenerConfig, MonitorConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    Env { key: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file without semantic validation.
pub fn load_file(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the layered configuration: defaults or the given file, then a
/// `.env` file if one exists, then the process environment.
///
/// The result is not validated yet so callers can apply overrides first.
pub fn load_layered(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => MonitorConfig::default(),
    };

    if let Ok(dotenv) = dotenvy::dotenv() {
        tracing::debug!(path = %dotenv.display(), "Loaded .env file");
    }

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Run semantic validation, turning the error list into a `ConfigError`.
pub fn validated(config: MonitorConfig) -> Result<MonitorConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests do not touch process state.
pub fn apply_env<F>(config: &mut MonitorConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(urls) = lookup("BACKEND_URLS") {
        config.targets.backend_urls = split_url_list(&urls);
    }
    if let Some(endpoint) = lookup("PING_ENDPOINT") {
        config.targets.ping_endpoint = endpoint.trim().to_string();
    }
    if let Some(cron) = lookup("CRON_SCHEDULE") {
        config.schedule.cron = cron.trim().to_string();
    }
    if let Some(value) = lookup("PING_INTERVAL_MS") {
        config.schedule.ping_interval_ms = parse_env("PING_INTERVAL_MS", &value)?;
    }
    if let Some(value) = lookup("BURST_DURATION_MS") {
        config.schedule.burst_duration_ms = parse_env("BURST_DURATION_MS", &value)?;
    }
    if let Some(value) = lookup("REQUEST_TIMEOUT_MS") {
        config.probe.timeout_ms = parse_env("REQUEST_TIMEOUT_MS", &value)?;
    }
    if let Some(value) = lookup("BURST_OVERLAP_POLICY") {
        config.schedule.overlap_policy = parse_env("BURST_OVERLAP_POLICY", &value)?;
    }
    if let Some(value) = lookup("PORT") {
        config.listener = ListenerConfig::with_port(parse_env("PORT", &value)?);
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level.trim().to_string();
    }
    if let Some(value) = lookup("LOG_FORMAT") {
        config.observability.log_format = parse_env("LOG_FORMAT", &value)?;
    }
    if let Some(address) = lookup("METRICS_ADDRESS") {
        let address = address.trim();
        if !address.is_empty() {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = address.to_string();
        }
    }
    Ok(())
}

/// Split a comma-separated URL list, dropping blanks.
pub fn split_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(String::from)
        .collect()
}

fn parse_env<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        key,
        reason: format!("{value:?}: {e}"),
    })
}
