//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and URLs and returns every
//! problem found, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} is not a socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("retries.retryable_statuses contains {0}, which is not an HTTP error status")]
    InvalidStatus(u16),
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("api.production_base_url", &config.api.production_base_url),
        ("api.development_base_url", &config.api.development_base_url),
    ] {
        if Url::parse(value).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }
    }

    for (field, value) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.health_check_secs", config.timeouts.health_check_secs),
        ("timeouts.reconnect_secs", config.timeouts.reconnect_secs),
        ("health_check.interval_secs", config.health_check.interval_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::Zero {
            field: "retries.max_attempts",
        });
    }

    for &status in &config.retries.retryable_statuses {
        if !(400..=599).contains(&status) {
            errors.push(ValidationError::InvalidStatus(status));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
