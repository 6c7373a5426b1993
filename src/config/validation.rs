//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes > 0, header values free of CR/LF)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::net::{IpAddr, SocketAddr};

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_host",
            format!("not an IP address: {}", config.listener.bind_host),
        ));
    }

    if config.cache.slots == 0 {
        errors.push(ValidationError::new("cache.slots", "must be at least 1"));
    }
    if config.cache.max_object_size == 0 {
        errors.push(ValidationError::new("cache.max_object_size", "must be at least 1"));
    }

    if config.upstream.relay_chunk_size == 0 {
        errors.push(ValidationError::new("upstream.relay_chunk_size", "must be at least 1"));
    }
    // Room for at least "\r\n" plus one byte.
    if config.upstream.max_line_length < 3 {
        errors.push(ValidationError::new("upstream.max_line_length", "must be at least 3"));
    }
    let ua = &config.upstream.user_agent;
    if ua.trim().is_empty() {
        errors.push(ValidationError::new("upstream.user_agent", "must not be empty"));
    } else if ua.contains(['\r', '\n']) {
        errors.push(ValidationError::new("upstream.user_agent", "must not contain CR or LF"));
    }
    if config.upstream.connect_timeout_secs == Some(0) {
        errors.push(ValidationError::new("upstream.connect_timeout_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
