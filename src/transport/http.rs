//! HTTP transport for SOAP exchanges, backed by `reqwest`.
//!
//! # Responsibilities
//! - Build one connection per call with the SOAP 1.1 request headers
//! - Enforce the fixed connect and read timeouts
//! - Expose request and response details to diagnostic probes
//!
//! # Design Decisions
//! - Idle pooling is disabled so every call owns its connection and the socket
//!   is released as soon as the exchange ends
//! - Request headers added later by the HTTP stack (host, content-length) are
//!   not observable and are not reported

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use std::time::Duration;
use url::Url;

use crate::config::WebServiceConfig;
use crate::transport::connection::{
    Connection, HeaderMultiMap, MessageSender, ProbeError, ProbeResult, RequestInspectable,
    ResponseInspectable, TransportError, WebServiceConnection,
};

pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";
pub const SOAP_ACTION: &str = "soapaction";

/// Creates [`HttpConnection`]s sharing one configured client.
#[derive(Debug, Clone)]
pub struct HttpMessageSender {
    client: reqwest::Client,
    soap_action: String,
}

impl HttpMessageSender {
    /// Build a sender with the configured connect and read timeouts.
    pub fn new(config: &WebServiceConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self::from_client(client, config.soap_action.clone()))
    }

    /// Use a pre-built client.
    pub fn from_client(client: reqwest::Client, soap_action: impl Into<String>) -> Self {
        Self {
            client,
            soap_action: soap_action.into(),
        }
    }
}

impl MessageSender for HttpMessageSender {
    fn create_connection(&self, uri: &Url) -> Result<Box<dyn WebServiceConnection>, TransportError> {
        let connection = HttpConnection::new(self.client.clone(), uri.clone(), &self.soap_action)?;
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
struct ResponseHead {
    status: StatusCode,
    headers: HeaderMap,
}

/// One SOAP-over-HTTP exchange.
#[derive(Debug)]
pub struct HttpConnection {
    client: reqwest::Client,
    uri: Url,
    method: Method,
    request_headers: HeaderMap,
    head: Option<ResponseHead>,
    pending: Option<reqwest::Response>,
}

impl HttpConnection {
    pub fn new(client: reqwest::Client, uri: Url, soap_action: &str) -> Result<Self, TransportError> {
        if !matches!(uri.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUri {
                uri: uri.to_string(),
                reason: format!("unsupported scheme '{}'", uri.scheme()),
            });
        }

        let action = HeaderValue::from_str(&format!("\"{}\"", soap_action)).map_err(|e| {
            TransportError::InvalidUri {
                uri: uri.to_string(),
                reason: format!("invalid SOAPAction: {}", e),
            }
        })?;

        let mut request_headers = HeaderMap::new();
        request_headers.insert(CONTENT_TYPE, HeaderValue::from_static(SOAP_CONTENT_TYPE));
        request_headers.insert(ACCEPT, HeaderValue::from_static("text/xml, text/html"));
        request_headers.insert(HeaderName::from_static(SOAP_ACTION), action);

        Ok(Self {
            client,
            uri,
            method: Method::POST,
            request_headers,
            head: None,
            pending: None,
        })
    }

    fn head(&self) -> ProbeResult<&ResponseHead> {
        self.head
            .as_ref()
            .ok_or(ProbeError::NotYetAvailable("response not received"))
    }
}

fn to_multimap(headers: &HeaderMap) -> HeaderMultiMap {
    let mut map = HeaderMultiMap::new();
    for (name, value) in headers {
        map.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    map
}

impl RequestInspectable for HttpConnection {
    fn request_method(&self) -> ProbeResult<String> {
        Ok(self.method.to_string())
    }

    fn request_headers(&self) -> ProbeResult<HeaderMultiMap> {
        Ok(to_multimap(&self.request_headers))
    }
}

impl ResponseInspectable for HttpConnection {
    fn status_code(&self) -> ProbeResult<u16> {
        self.head().map(|h| h.status.as_u16())
    }

    fn status_text(&self) -> ProbeResult<String> {
        let head = self.head()?;
        head.status
            .canonical_reason()
            .map(str::to_string)
            .ok_or_else(|| ProbeError::Failed(format!("no reason phrase for {}", head.status)))
    }

    fn response_headers(&self) -> ProbeResult<HeaderMultiMap> {
        self.head().map(|h| to_multimap(&h.headers))
    }
}

impl Connection for HttpConnection {
    fn uri(&self) -> Option<&Url> {
        Some(&self.uri)
    }

    fn request_inspector(&self) -> Option<&dyn RequestInspectable> {
        Some(self)
    }

    fn response_inspector(&self) -> Option<&dyn ResponseInspectable> {
        Some(self)
    }
}

#[async_trait]
impl WebServiceConnection for HttpConnection {
    async fn send(&mut self, body: Vec<u8>) -> Result<(), TransportError> {
        if self.head.is_some() {
            return Err(TransportError::State("request already sent"));
        }

        let response = self
            .client
            .request(self.method.clone(), self.uri.clone())
            .headers(self.request_headers.clone())
            .body(body)
            .send()
            .await?;

        self.head = Some(ResponseHead {
            status: response.status(),
            headers: response.headers().clone(),
        });
        self.pending = Some(response);
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let response = self
            .pending
            .take()
            .ok_or(TransportError::State("receive called before send"))?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(bytes.to_vec()))
        }
    }

    fn has_error(&self) -> bool {
        self.head
            .as_ref()
            .map(|h| h.status.is_client_error() || h.status.is_server_error())
            .unwrap_or(false)
    }

    fn error_message(&self) -> Option<String> {
        self.head.as_ref().map(|h| h.status.to_string())
    }

    fn as_connection(&self) -> &dyn Connection {
        self
    }
}
