//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (deadline > 0, failure ceilings > 0, frequencies > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check value ranges across the whole configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.shutdown.deadline_secs == 0 {
        errors.push(ValidationError::new("shutdown.deadline_secs", "must be greater than 0"));
    }

    let monitors = [
        ("database_monitor", config.database_monitor.failure_max, config.database_monitor.frequency_secs),
        ("ping_monitor", config.ping_monitor.failure_max, config.ping_monitor.frequency_secs),
    ];
    for (section, failure_max, frequency_secs) in monitors {
        if failure_max == 0 {
            errors.push(ValidationError::new(&format!("{section}.failure_max"), "must be greater than 0"));
        }
        if frequency_secs == 0 {
            errors.push(ValidationError::new(&format!("{section}.frequency_secs"), "must be greater than 0"));
        }
    }

    if config.ping_monitor.connect_timeout_ms == 0 {
        errors.push(ValidationError::new("ping_monitor.connect_timeout_ms", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "must be a socket address"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
