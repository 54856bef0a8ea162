//! SOAP-level types and error definitions.

use std::fmt;
use thiserror::Error;

use crate::transport::TransportError;

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// A (namespace, local-name) pair identifying an XML element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub namespace: String,
    pub local_name: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local_name)
    }
}

/// A fault returned by the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoapFault {
    pub code: String,
    pub reason: String,
    pub detail: Option<String>,
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.reason)
    }
}

/// Errors raised while reading or writing SOAP XML.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoapError {
    #[error("XML error: {0}")]
    Xml(String),

    #[error("malformed SOAP envelope: {0}")]
    MalformedEnvelope(String),
}

impl SoapError {
    pub(crate) fn xml(e: impl fmt::Display) -> Self {
        SoapError::Xml(e.to_string())
    }
}

/// Errors surfaced by a SOAP exchange.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network, connection or HTTP-level failure.
    #[error("transport failure")]
    Transport(#[from] TransportError),

    /// The remote endpoint answered with a SOAP fault.
    #[error("SOAP fault {0}")]
    Fault(SoapFault),

    #[error("failed to marshal request: {0}")]
    Marshal(String),

    #[error("failed to unmarshal response: {0}")]
    Unmarshal(String),

    #[error(transparent)]
    Message(#[from] SoapError),
}

impl GatewayError {
    /// Whether the remote endpoint explicitly signalled the failure.
    pub fn is_fault(&self) -> bool {
        matches!(self, GatewayError::Fault(_))
    }
}

/// Render an error followed by its source chain.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_display() {
        let name = QualifiedName::new("http://cbcm.pull.cis.sem/", "getSubscriptionDtls");
        assert_eq!(name.to_string(), "{http://cbcm.pull.cis.sem/}getSubscriptionDtls");
    }

    #[test]
    fn fault_error_display() {
        let err = GatewayError::Fault(SoapFault {
            code: "soap:Server".into(),
            reason: "Subscriber not found".into(),
            detail: None,
        });
        assert!(err.is_fault());
        assert_eq!(err.to_string(), "SOAP fault soap:Server: Subscriber not found");
    }

    #[test]
    fn chain_includes_sources() {
        let err = GatewayError::Transport(TransportError::Request(
            "SOAP service unavailable".into(),
        ));
        assert!(!err.is_fault());
        assert_eq!(
            error_chain(&err),
            "transport failure: request failed: SOAP service unavailable"
        );
    }
}
