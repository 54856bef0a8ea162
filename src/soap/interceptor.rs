//! Client interceptors around SOAP exchanges.
//!
//! # Responsibilities
//! - Define the hook points of an exchange (request, response, fault, completion)
//! - Log outbound and inbound messages with transport diagnostics
//!
//! # Design Decisions
//! - Hooks return `false` to halt the chain; the logging interceptor never does
//! - Logging work is guarded: an error or panic while tracing or probing is
//!   logged and swallowed, so the observed call is never affected

use std::panic::{self, AssertUnwindSafe};
use tracing::{Level, Span};

use crate::soap::message::SoapMessage;
use crate::soap::tracer;
use crate::soap::types::{error_chain, GatewayError};
use crate::transport::{probe, Connection};

/// What an interceptor can see of an exchange in progress.
pub struct ExchangeContext<'a> {
    request: &'a SoapMessage,
    response: Option<&'a SoapMessage>,
    connection: Option<&'a dyn Connection>,
}

impl<'a> ExchangeContext<'a> {
    pub fn new(
        request: &'a SoapMessage,
        response: Option<&'a SoapMessage>,
        connection: Option<&'a dyn Connection>,
    ) -> Self {
        Self {
            request,
            response,
            connection,
        }
    }

    pub fn request(&self) -> &SoapMessage {
        self.request
    }

    pub fn response(&self) -> Option<&SoapMessage> {
        self.response
    }

    pub fn connection(&self) -> Option<&dyn Connection> {
        self.connection
    }
}

/// Hooks invoked by [`SoapClient`](crate::soap::SoapClient) around every exchange.
pub trait ClientInterceptor: Send + Sync {
    /// Before the request is sent. Returning `false` skips dispatch.
    fn handle_request(&self, ctx: &ExchangeContext<'_>) -> bool;

    /// After a normal response was received.
    fn handle_response(&self, ctx: &ExchangeContext<'_>) -> bool;

    /// After the endpoint answered with a SOAP fault.
    fn handle_fault(&self, ctx: &ExchangeContext<'_>) -> bool;

    /// Always runs last, with the error that ended the exchange, if any.
    fn after_completion(&self, ctx: &ExchangeContext<'_>, error: Option<&GatewayError>);
}

/// Logs SOAP bodies, header blocks and HTTP details of each exchange.
#[derive(Debug, Clone)]
pub struct LoggingInterceptor {
    span: Span,
}

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self::with_span(tracing::info_span!("soap_interceptor"))
    }

    /// Log within the given span.
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    fn guarded(&self, hook: &'static str, f: impl FnOnce()) {
        let _entered = self.span.enter();
        if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
            tracing::warn!(hook, "Diagnostic logging failed; continuing");
        }
    }

    fn log_request(ctx: &ExchangeContext<'_>) {
        tracing::debug!("=== OUTBOUND SOAP REQUEST ===");
        match ctx.connection() {
            Some(connection) => probe::probe_request(connection).log_outgoing(),
            None => tracing::debug!("No connection attached to SOAP request"),
        }
        log_message("Request", ctx.request());
        tracing::debug!("=== END OUTBOUND SOAP REQUEST ===");
    }

    fn log_response(ctx: &ExchangeContext<'_>) {
        tracing::debug!("=== INBOUND SOAP RESPONSE ===");
        if let Some(connection) = ctx.connection() {
            probe::probe_response(connection).log_incoming();
        }
        match ctx.response() {
            Some(response) => log_message("Response", response),
            None => tracing::debug!(body = tracer::NO_CONTENT, "Response SOAP Body"),
        }
        tracing::debug!("=== END INBOUND SOAP RESPONSE ===");
    }
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

fn log_message(direction: &'static str, message: &SoapMessage) {
    if let Some(fault) = message.fault() {
        tracing::debug!(
            direction,
            code = %fault.code,
            reason = %fault.reason,
            detail = %tracer::render(fault.detail.as_deref()),
            "SOAP Fault"
        );
    } else {
        let body = tracer::render(message.payload_source());
        tracing::debug!(direction, "SOAP Body:\n{}", body);
    }

    if let Some(header) = message.header_source() {
        let headers = tracer::render(Some(header));
        tracing::debug!(direction, "SOAP Headers:\n{}", headers);
    }
}

impl ClientInterceptor for LoggingInterceptor {
    fn handle_request(&self, ctx: &ExchangeContext<'_>) -> bool {
        if tracing::enabled!(Level::DEBUG) {
            self.guarded("handle_request", || Self::log_request(ctx));
        }
        true
    }

    fn handle_response(&self, ctx: &ExchangeContext<'_>) -> bool {
        if tracing::enabled!(Level::DEBUG) {
            self.guarded("handle_response", || Self::log_response(ctx));
        }
        true
    }

    fn handle_fault(&self, ctx: &ExchangeContext<'_>) -> bool {
        self.guarded("handle_fault", || {
            let fault = ctx.response().and_then(SoapMessage::fault);
            tracing::error!(
                code = fault.map(|f| f.code.as_str()).unwrap_or(""),
                reason = fault.map(|f| f.reason.as_str()).unwrap_or(""),
                "SOAP Fault occurred during web service call"
            );
            Self::log_response(ctx);
        });
        true
    }

    fn after_completion(&self, _ctx: &ExchangeContext<'_>, error: Option<&GatewayError>) {
        if let Some(error) = error {
            self.guarded("after_completion", || {
                tracing::error!(
                    error = %error_chain(error),
                    "Exception occurred during web service call"
                );
            });
        }
    }
}
