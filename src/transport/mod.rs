//! Outbound transport subsystem.
//!
//! # Data Flow
//! ```text
//! SoapClient
//!     → MessageSender::create_connection (one connection per call)
//!     → logging.rs (phase logging decorator)
//!     → http.rs (reqwest, fixed connect/read timeouts)
//!     → remote SOAP endpoint
//!
//! Diagnostics:
//!     probe.rs reads connection.rs capabilities → DiagnosticRecord → log
//! ```

pub mod connection;
pub mod http;
pub mod logging;
pub mod probe;

pub use connection::{
    Connection, HeaderMultiMap, MessageSender, ProbeError, ProbeResult, RequestInspectable,
    ResponseInspectable, TransportError, WebServiceConnection,
};
pub use http::{HttpConnection, HttpMessageSender};
pub use logging::LoggingMessageSender;
pub use probe::{DiagnosticRecord, Observed};
