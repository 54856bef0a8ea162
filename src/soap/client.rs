//! Request/response template for SOAP endpoints.
//!
//! # Exchange Flow
//! ```text
//! marshal payload
//!     → create connection (one per call)
//!     → request hooks, in registration order (false = skip dispatch)
//!     → send, receive
//!     → fault?    fault hooks, reverse order     → Err(Fault)
//!       empty?    Ok(None)
//!       otherwise response hooks, reverse order → unmarshal
//!     → completion hooks, reverse order, always; a marshal or connection
//!       failure skips straight here with an empty request and no connection
//!     → drop connection
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{Instrument, Span};
use url::Url;

use crate::config::WebServiceConfig;
use crate::soap::envelope::{self, QualifiedEnvelope};
use crate::soap::interceptor::{ClientInterceptor, ExchangeContext, LoggingInterceptor};
use crate::soap::message::SoapMessage;
use crate::soap::types::{GatewayError, QualifiedName};
use crate::transport::{
    Connection, HttpMessageSender, LoggingMessageSender, MessageSender, TransportError,
    WebServiceConnection,
};

/// Sends qualified payloads to a single default endpoint.
pub struct SoapClient {
    default_uri: Url,
    sender: Arc<dyn MessageSender>,
    interceptors: Vec<Arc<dyn ClientInterceptor>>,
    span: Span,
}

impl SoapClient {
    pub fn new(default_uri: Url, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            default_uri,
            sender,
            interceptors: Vec::new(),
            span: tracing::info_span!("soap_client"),
        }
    }

    /// HTTP client for the configured endpoint with connection phase logging
    /// and a [`LoggingInterceptor`] installed.
    pub fn from_config(config: &WebServiceConfig) -> Result<Self, GatewayError> {
        let uri = Url::parse(&config.url).map_err(|e| TransportError::InvalidUri {
            uri: config.url.clone(),
            reason: e.to_string(),
        })?;
        let sender = LoggingMessageSender::new(HttpMessageSender::new(config)?);

        Ok(Self::new(uri, Arc::new(sender))
            .with_interceptor(Arc::new(LoggingInterceptor::new())))
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn ClientInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Log within the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn default_uri(&self) -> &Url {
        &self.default_uri
    }

    /// Marshal `request`, exchange it with the endpoint and unmarshal the
    /// element named `response_name` from the reply.
    ///
    /// `Ok(None)` means the endpoint returned no content, or an interceptor
    /// halted the exchange before dispatch.
    pub async fn marshal_send_and_receive<Req, Res>(
        &self,
        request: &QualifiedEnvelope<Req>,
        response_name: &QualifiedName,
    ) -> Result<Option<QualifiedEnvelope<Res>>, GatewayError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        async {
            let message = match envelope::marshal(request) {
                Ok(message) => message,
                Err(e) => return self.complete(&SoapMessage::default(), None, None, Err(e)),
            };
            let mut connection = match self.sender.create_connection(&self.default_uri) {
                Ok(connection) => connection,
                Err(e) => return self.complete(&message, None, None, Err(e.into())),
            };
            let mut response = None;

            let result = self
                .exchange(connection.as_mut(), &message, &mut response, response_name)
                .await;

            self.complete(
                &message,
                response.as_ref(),
                Some(connection.as_connection()),
                result,
            )
        }
        .instrument(self.span.clone())
        .await
    }

    /// Run the completion hooks, in reverse order, and pass `result` through.
    fn complete<T>(
        &self,
        request: &SoapMessage,
        response: Option<&SoapMessage>,
        connection: Option<&dyn Connection>,
        result: Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let ctx = ExchangeContext::new(request, response, connection);
        for interceptor in self.interceptors.iter().rev() {
            interceptor.after_completion(&ctx, result.as_ref().err());
        }
        result
    }

    async fn exchange<Res: DeserializeOwned>(
        &self,
        connection: &mut dyn WebServiceConnection,
        request: &SoapMessage,
        response: &mut Option<SoapMessage>,
        response_name: &QualifiedName,
    ) -> Result<Option<QualifiedEnvelope<Res>>, GatewayError> {
        {
            let ctx = ExchangeContext::new(request, None, Some(connection.as_connection()));
            for interceptor in &self.interceptors {
                if !interceptor.handle_request(&ctx) {
                    tracing::debug!("Exchange halted before dispatch");
                    return Ok(None);
                }
            }
        }

        connection.send(request.to_xml().into_bytes()).await?;
        let body = connection.receive().await?;

        if connection.has_error() {
            let fault = body
                .as_deref()
                .and_then(|b| SoapMessage::parse(b).ok())
                .filter(SoapMessage::has_fault);
            return match fault {
                Some(message) => self.fault(connection, request, response.insert(message)),
                None => Err(TransportError::HttpStatus(
                    connection
                        .error_message()
                        .unwrap_or_else(|| "unknown status".to_string()),
                )
                .into()),
            };
        }

        let Some(body) = body else {
            return Ok(None);
        };

        let message: &SoapMessage = response.insert(SoapMessage::parse(&body)?);
        if message.has_fault() {
            return self.fault(connection, request, message);
        }

        let ctx = ExchangeContext::new(request, Some(message), Some(connection.as_connection()));
        for interceptor in self.interceptors.iter().rev() {
            if !interceptor.handle_response(&ctx) {
                break;
            }
        }

        envelope::unmarshal(message, response_name)
    }

    fn fault<Res>(
        &self,
        connection: &dyn WebServiceConnection,
        request: &SoapMessage,
        response: &SoapMessage,
    ) -> Result<Option<QualifiedEnvelope<Res>>, GatewayError> {
        let ctx = ExchangeContext::new(request, Some(response), Some(connection.as_connection()));
        for interceptor in self.interceptors.iter().rev() {
            if !interceptor.handle_fault(&ctx) {
                break;
            }
        }
        Err(GatewayError::Fault(response.fault().cloned().unwrap_or_default()))
    }
}
