//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every target parses as an absolute http(s) URL
//! - Validate value ranges (durations > 0, interval fits inside a burst)
//! - Check the cron expression and listener addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::MonitorConfig;
use crate::scheduler::cron::CronSchedule;
use crate::targets::parse_base_url;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no backend URLs configured (set BACKEND_URLS)")]
    NoTargets,

    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("ping endpoint {0:?} must start with '/'")]
    InvalidPingEndpoint(String),

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("ping interval ({interval_ms}ms) exceeds burst duration ({burst_ms}ms)")]
    IntervalExceedsBurst { interval_ms: u64, burst_ms: u64 },

    #[error("invalid cron schedule {expression:?}: {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("invalid {field} {value:?}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a fully layered configuration.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let urls: Vec<&str> = config
        .targets
        .backend_urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();
    if urls.is_empty() {
        errors.push(ValidationError::NoTargets);
    }
    for url in urls {
        if let Err(e) = parse_base_url(url) {
            errors.push(ValidationError::InvalidTarget {
                url: url.to_string(),
                reason: e.to_string(),
            });
        }
    }

    if !config.targets.ping_endpoint.starts_with('/') {
        errors.push(ValidationError::InvalidPingEndpoint(
            config.targets.ping_endpoint.clone(),
        ));
    }

    let schedule = &config.schedule;
    for (field, value) in [
        ("ping_interval_ms", schedule.ping_interval_ms),
        ("burst_duration_ms", schedule.burst_duration_ms),
        ("probe timeout_ms", config.probe.timeout_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }
    if schedule.ping_interval_ms > schedule.burst_duration_ms && schedule.burst_duration_ms > 0 {
        errors.push(ValidationError::IntervalExceedsBurst {
            interval_ms: schedule.ping_interval_ms,
            burst_ms: schedule.burst_duration_ms,
        });
    }

    if let Err(e) = schedule.cron.parse::<CronSchedule>() {
        errors.push(ValidationError::InvalidCron {
            expression: schedule.cron.clone(),
            reason: e.to_string(),
        });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "bind address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.targets.backend_urls = vec!["http://a.test".into(), "https://b.test".into()];
        config
    }

    #[test]
    fn accepts_valid_config() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn rejects_empty_target_list() {
        let mut config = valid_config();
        config.targets.backend_urls = vec!["  ".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoTargets]);
    }

    #[test]
    fn reports_every_problem() {
        let mut config = valid_config();
        config.targets.backend_urls.push("ftp://c.test".into());
        config.targets.ping_endpoint = "health".into();
        config.schedule.cron = "61 * * * *".into();
        config.probe.timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(matches!(errors[0], ValidationError::InvalidTarget { ref url, .. } if url == "ftp://c.test"));
        assert!(errors.contains(&ValidationError::InvalidPingEndpoint("health".into())));
        assert!(errors.contains(&ValidationError::ZeroDuration { field: "probe timeout_ms" }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidCron { .. })));
    }

    #[test]
    fn interval_must_fit_inside_burst() {
        let mut config = valid_config();
        config.schedule.ping_interval_ms = 90_000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::IntervalExceedsBurst {
                interval_ms: 90_000,
                burst_ms: 60_000
            }]
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = valid_config();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
