//! SOAP messaging subsystem.
//!
//! # Data Flow
//! ```text
//! payload + QualifiedName
//!     → envelope.rs (marshal into SoapMessage)
//!     → client.rs (interceptor chain, connection exchange)
//!     → message.rs (parse reply, detect faults)
//!     → envelope.rs (unmarshal expected element)
//!
//! Diagnostics:
//!     interceptor.rs → tracer.rs (indented XML) + transport probe
//! ```

pub mod client;
pub mod envelope;
pub mod interceptor;
pub mod message;
pub mod tracer;
pub mod types;

pub use client::SoapClient;
pub use envelope::{MissingValue, QualifiedEnvelope};
pub use interceptor::{ClientInterceptor, ExchangeContext, LoggingInterceptor};
pub use message::SoapMessage;
pub use types::{error_chain, GatewayError, QualifiedName, SoapError, SoapFault};
