//! Connection abstractions and diagnostic capabilities.
//!
//! A [`Connection`] only promises that it *may* expose its target URI. Anything
//! else a diagnostic probe can read is negotiated explicitly: a connection hands
//! out a [`RequestInspectable`] or [`ResponseInspectable`] view when it supports
//! one, and a decorating connection exposes the connection it wraps through
//! [`Connection::inner`].

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Header name → values, in the order the transport reported them.
pub type HeaderMultiMap = BTreeMap<String, Vec<String>>;

/// Failure to read one diagnostic field from a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The value exists in principle but cannot be read at this point of the exchange.
    #[error("not available yet: {0}")]
    NotYetAvailable(&'static str),

    /// The connection failed while producing the value.
    #[error("inspection failed: {0}")]
    Failed(String),
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Read access to the request side of an exchange.
pub trait RequestInspectable {
    fn request_method(&self) -> ProbeResult<String>;
    fn request_headers(&self) -> ProbeResult<HeaderMultiMap>;
}

/// Read access to the response side of an exchange.
pub trait ResponseInspectable {
    fn status_code(&self) -> ProbeResult<u16>;
    fn status_text(&self) -> ProbeResult<String>;
    fn response_headers(&self) -> ProbeResult<HeaderMultiMap>;
}

/// Anything that carries one outbound exchange.
pub trait Connection: Send + Sync {
    /// Target URI, if the connection can report it.
    fn uri(&self) -> Option<&Url>;

    fn request_inspector(&self) -> Option<&dyn RequestInspectable> {
        None
    }

    fn response_inspector(&self) -> Option<&dyn ResponseInspectable> {
        None
    }

    /// The connection this one decorates, if any.
    fn inner(&self) -> Option<&dyn Connection> {
        None
    }
}

/// Errors raised by the network transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("request timed out")]
    Timeout(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("request failed")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("HTTP error: {0}")]
    HttpStatus(String),

    #[error("connection used out of order: {0}")]
    State(&'static str),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(Box::new(e))
        } else {
            TransportError::Request(Box::new(e))
        }
    }
}

/// A connection that can carry one request/response exchange.
///
/// `send` transmits the request and waits for the response head; `receive` reads
/// the body. Implementations release their network resources when dropped.
#[async_trait]
pub trait WebServiceConnection: Connection {
    async fn send(&mut self, body: Vec<u8>) -> Result<(), TransportError>;

    /// Response body, or `None` when the endpoint sent no content.
    async fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Whether the response status signals an error.
    fn has_error(&self) -> bool;

    /// Status line of an erroneous response, e.g. `503 Service Unavailable`.
    fn error_message(&self) -> Option<String>;

    fn as_connection(&self) -> &dyn Connection;
}

/// Factory for per-call connections.
pub trait MessageSender: Send + Sync {
    fn create_connection(&self, uri: &Url) -> Result<Box<dyn WebServiceConnection>, TransportError>;
}
