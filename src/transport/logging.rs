//! Message sender decorator that logs HTTP-level traffic.
//!
//! Every connection created through [`LoggingMessageSender`] is wrapped so that
//! the send and receive phases are logged together with whatever the diagnostic
//! probe can observe on the wrapped connection.

use async_trait::async_trait;
use url::Url;

use crate::transport::connection::{
    Connection, MessageSender, TransportError, WebServiceConnection,
};
use crate::transport::probe;

/// Wraps another sender's connections with HTTP phase logging.
#[derive(Debug, Clone)]
pub struct LoggingMessageSender<S> {
    inner: S,
}

impl<S: MessageSender> LoggingMessageSender<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: MessageSender> MessageSender for LoggingMessageSender<S> {
    fn create_connection(&self, uri: &Url) -> Result<Box<dyn WebServiceConnection>, TransportError> {
        let delegate = self.inner.create_connection(uri)?;
        Ok(Box::new(LoggingConnection { delegate }))
    }
}

struct LoggingConnection {
    delegate: Box<dyn WebServiceConnection>,
}

impl Connection for LoggingConnection {
    fn uri(&self) -> Option<&Url> {
        self.delegate.as_connection().uri()
    }

    fn inner(&self) -> Option<&dyn Connection> {
        Some(self.delegate.as_connection())
    }
}

#[async_trait]
impl WebServiceConnection for LoggingConnection {
    async fn send(&mut self, body: Vec<u8>) -> Result<(), TransportError> {
        tracing::debug!("=== SENDING HTTP REQUEST ===");
        probe::probe_request(self.delegate.as_connection()).log_outgoing();

        self.delegate.send(body).await?;

        tracing::debug!("=== HTTP REQUEST SENT ===");
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        tracing::debug!("=== RECEIVING HTTP RESPONSE ===");

        let body = self.delegate.receive().await?;
        probe::probe_response(self.delegate.as_connection()).log_incoming();

        tracing::debug!(
            bytes = body.as_ref().map(Vec::len).unwrap_or(0),
            "=== HTTP RESPONSE RECEIVED ==="
        );
        Ok(body)
    }

    fn has_error(&self) -> bool {
        self.delegate.has_error()
    }

    fn error_message(&self) -> Option<String> {
        self.delegate.error_message()
    }

    fn as_connection(&self) -> &dyn Connection {
        self
    }
}
