//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Require the store credentials the service cannot run without
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.relay.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("relay.connect_timeout_secs", "must be greater than 0"));
    }
    if config.relay.upstream_timeout_secs == 0 {
        errors.push(ValidationError::new("relay.upstream_timeout_secs", "must be greater than 0"));
    }
    if config.relay.allowed_hosts.iter().any(|h| h.trim().is_empty()) {
        errors.push(ValidationError::new("relay.allowed_hosts", "entries must not be empty"));
    }
    for path in &config.relay.extra_root_certs {
        if !path.is_file() {
            errors.push(ValidationError::new(
                "relay.extra_root_certs",
                format!("{} is not a readable file", path.display()),
            ));
        }
    }

    if config.store.url.is_empty() {
        errors.push(ValidationError::new("store.url", "must be set (SUPABASE_URL)"));
    } else {
        match url::Url::parse(&config.store.url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => errors.push(ValidationError::new(
                "store.url",
                format!("'{}' is not an http(s) URL", config.store.url),
            )),
        }
    }
    if config.store.api_key.is_empty() {
        errors.push(ValidationError::new("store.api_key", "must be set (SUPABASE_KEY)"));
    }
    if config.store.table.is_empty() {
        errors.push(ValidationError::new("store.table", "must not be empty"));
    }
    if config.store.timeout_secs == 0 {
        errors.push(ValidationError::new("store.timeout_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
