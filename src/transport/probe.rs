//! Best-effort transport diagnostics.
//!
//! # Responsibilities
//! - Read method, URL, headers and status from an arbitrary [`Connection`]
//! - Fall back from a connection's own capabilities to the connection it wraps
//! - Record what could not be observed instead of failing
//!
//! # Design Decisions
//! - Each field is probed independently; one failing read never hides another
//! - Probing is read-only and never touches the network
//! - Records are logged and dropped, never handed to callers of the gateway

use std::fmt;

use crate::transport::connection::{Connection, HeaderMultiMap, ProbeResult};

/// How many decorator layers the probe descends through.
const MAX_DEPTH: usize = 4;

/// A diagnostic value, or the fact that it could not be observed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Observed<T> {
    Value(T),
    #[default]
    NotAccessible,
}

impl<T> Observed<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Observed::Value(v) => Some(v),
            Observed::NotAccessible => None,
        }
    }

    pub fn is_accessible(&self) -> bool {
        matches!(self, Observed::Value(_))
    }
}

impl<T: fmt::Display> fmt::Display for Observed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Value(v) => v.fmt(f),
            Observed::NotAccessible => f.write_str("<not accessible>"),
        }
    }
}

/// Transport facts observed around one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagnosticRecord {
    pub method: Observed<String>,
    pub url: Observed<String>,
    pub request_headers: Observed<HeaderMultiMap>,
    pub status_code: Observed<u16>,
    pub status_text: Observed<String>,
    pub response_headers: Observed<HeaderMultiMap>,
}

impl DiagnosticRecord {
    /// A record where nothing could be observed.
    pub fn not_accessible() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Log the request-side facts.
    pub fn log_outgoing(&self) {
        if !self.method.is_accessible() && !self.url.is_accessible() {
            tracing::debug!("Outgoing HTTP details not accessible");
            return;
        }
        tracing::debug!(method = %self.method, url = %self.url, "Outgoing HTTP request");
        log_headers("Outgoing HTTP header", &self.request_headers);
    }

    /// Log the response-side facts.
    pub fn log_incoming(&self) {
        if !self.status_code.is_accessible() {
            tracing::debug!("Incoming HTTP details not accessible");
            return;
        }
        tracing::debug!(
            status = %self.status_code,
            status_text = %self.status_text,
            "Incoming HTTP response"
        );
        log_headers("Incoming HTTP header", &self.response_headers);
    }
}

fn log_headers(message: &'static str, headers: &Observed<HeaderMultiMap>) {
    match headers {
        Observed::Value(map) => {
            for (name, values) in map {
                for value in values {
                    tracing::debug!(header = %name, value = %value, "{}", message);
                }
            }
        }
        Observed::NotAccessible => tracing::debug!("{}s not accessible", message),
    }
}

/// Probe the request side: URL, method and request headers.
pub fn probe_request(connection: &dyn Connection) -> DiagnosticRecord {
    DiagnosticRecord {
        url: observe(connection, "url", |c| c.uri().map(|u| Ok(u.to_string()))),
        method: observe(connection, "method", |c| {
            c.request_inspector().map(|i| i.request_method())
        }),
        request_headers: observe(connection, "request_headers", |c| {
            c.request_inspector().map(|i| i.request_headers())
        }),
        ..DiagnosticRecord::not_accessible()
    }
}

/// Probe the response side: status and response headers.
pub fn probe_response(connection: &dyn Connection) -> DiagnosticRecord {
    DiagnosticRecord {
        url: observe(connection, "url", |c| c.uri().map(|u| Ok(u.to_string()))),
        status_code: observe(connection, "status_code", |c| {
            c.response_inspector().map(|i| i.status_code())
        }),
        status_text: observe(connection, "status_text", |c| {
            c.response_inspector().map(|i| i.status_text())
        }),
        response_headers: observe(connection, "response_headers", |c| {
            c.response_inspector().map(|i| i.response_headers())
        }),
        ..DiagnosticRecord::not_accessible()
    }
}

/// Probe everything the connection exposes.
pub fn probe(connection: &dyn Connection) -> DiagnosticRecord {
    let request = probe_request(connection);
    let response = probe_response(connection);
    DiagnosticRecord {
        method: request.method,
        url: request.url,
        request_headers: request.request_headers,
        status_code: response.status_code,
        status_text: response.status_text,
        response_headers: response.response_headers,
    }
}

/// Walk the connection and its wrapped connections until `read` yields a value.
///
/// `read` returns `None` when a level lacks the capability altogether.
fn observe<T>(
    connection: &dyn Connection,
    field: &'static str,
    read: impl Fn(&dyn Connection) -> Option<ProbeResult<T>>,
) -> Observed<T> {
    let mut current = Some(connection);
    let mut depth = 0;

    while let Some(level) = current {
        if depth >= MAX_DEPTH {
            tracing::debug!(field, depth, "Probe depth limit reached");
            break;
        }
        match read(level) {
            Some(Ok(value)) => return Observed::Value(value),
            Some(Err(e)) => tracing::debug!(field, depth, error = %e, "Could not read connection field"),
            None => tracing::trace!(field, depth, "Capability not exposed"),
        }
        current = level.inner();
        depth += 1;
    }

    Observed::NotAccessible
}
