//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the CIS gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Outbound SOAP endpoint and schema binding.
    pub webservice: WebServiceConfig,

    /// Inbound request timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Outbound SOAP web service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebServiceConfig {
    /// Endpoint URL of the CIS SOAP service.
    pub url: String,

    /// Target namespace of the request/response elements.
    pub namespace: String,

    /// Local name of the request root element.
    pub request_element: String,

    /// Local name of the response root element.
    pub response_element: String,

    /// Value sent in the `SOAPAction` header.
    pub soap_action: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for WebServiceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/soap/cis".to_string(),
            namespace: "http://cbcm.pull.cis.sem/".to_string(),
            request_element: "getSubscriptionDtls".to_string(),
            response_element: "getSubscriptionDtlsResponse".to_string(),
            soap_action: String::new(),
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Must outlast the outbound connect + read timeouts.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 95 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_webservice_binding() {
        let config = GatewayConfig::default();
        assert_eq!(config.webservice.url, "http://localhost:8080/soap/cis");
        assert_eq!(config.webservice.namespace, "http://cbcm.pull.cis.sem/");
        assert_eq!(config.webservice.request_element, "getSubscriptionDtls");
        assert_eq!(config.webservice.connect_timeout_secs, 30);
        assert_eq!(config.webservice.read_timeout_secs, 60);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [webservice]
            url = "http://cis.internal:7001/cbcm/pull"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.webservice.url, "http://cis.internal:7001/cbcm/pull");
        assert_eq!(config.webservice.read_timeout_secs, 60);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
