//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the outbound endpoint and schema binding
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("webservice.url '{url}' is invalid: {reason}")]
    EndpointUrl { url: String, reason: String },

    #[error("webservice.{0} must not be empty")]
    EmptyBinding(&'static str),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let ws = &config.webservice;
    match Url::parse(&ws.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::EndpointUrl {
            url: ws.url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::EndpointUrl {
            url: ws.url.clone(),
            reason: e.to_string(),
        }),
    }

    if ws.namespace.trim().is_empty() {
        errors.push(ValidationError::EmptyBinding("namespace"));
    }
    if ws.request_element.trim().is_empty() {
        errors.push(ValidationError::EmptyBinding("request_element"));
    }
    if ws.response_element.trim().is_empty() {
        errors.push(ValidationError::EmptyBinding("response_element"));
    }

    if ws.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("webservice.connect_timeout_secs"));
    }
    if ws.read_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("webservice.read_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
