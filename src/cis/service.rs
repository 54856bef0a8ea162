//! CIS pull service: one subscription lookup per call.
//!
//! # Call States
//! ```text
//! Building     wrap payload with the configured request element
//! Dispatching  exchange through SubscriptionOperations
//! Classifying  error → Failure, no value → EmptyResponse, value → Success
//! ```
//!
//! No retries and no per-call timeout; connect and read timeouts belong to the
//! transport.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{Instrument, Span};

use crate::cis::types::{GetSubscriptionDtls, GetSubscriptionDtlsResponse};
use crate::config::WebServiceConfig;
use crate::observability::metrics;
use crate::soap::envelope::{self, QualifiedEnvelope};
use crate::soap::{error_chain, GatewayError, QualifiedName, SoapClient};

/// The remote subscription lookup, as seen by the service.
#[async_trait]
pub trait SubscriptionOperations: Send + Sync {
    async fn get_subscription_details(
        &self,
        request: &QualifiedEnvelope<GetSubscriptionDtls>,
        response_name: &QualifiedName,
    ) -> Result<Option<QualifiedEnvelope<GetSubscriptionDtlsResponse>>, GatewayError>;
}

#[async_trait]
impl SubscriptionOperations for SoapClient {
    async fn get_subscription_details(
        &self,
        request: &QualifiedEnvelope<GetSubscriptionDtls>,
        response_name: &QualifiedName,
    ) -> Result<Option<QualifiedEnvelope<GetSubscriptionDtlsResponse>>, GatewayError> {
        self.marshal_send_and_receive(request, response_name).await
    }
}

/// How a call ended. Exactly one per call.
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    /// The exchange succeeded but carried no payload; holds a placeholder.
    EmptyResponse(T),
    Failure(GatewayError),
}

impl<T> CallOutcome<T> {
    /// Metric and header label.
    pub fn label(&self) -> &'static str {
        match self {
            CallOutcome::Success(_) => "success",
            CallOutcome::EmptyResponse(_) => "empty",
            CallOutcome::Failure(_) => "failure",
        }
    }
}

#[derive(Debug, Error)]
#[error("failed to process CIS pull request")]
pub struct ProcessingError {
    #[source]
    pub cause: GatewayError,
}

/// Forwards subscription lookups to CIS and classifies the result.
pub struct CisPullService {
    operations: Arc<dyn SubscriptionOperations>,
    request_name: QualifiedName,
    response_name: QualifiedName,
    span: Span,
}

impl CisPullService {
    pub fn new(operations: Arc<dyn SubscriptionOperations>, config: &WebServiceConfig) -> Self {
        Self {
            operations,
            request_name: QualifiedName::new(&config.namespace, &config.request_element),
            response_name: QualifiedName::new(&config.namespace, &config.response_element),
            span: tracing::info_span!("cis_pull"),
        }
    }

    /// Log within the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub async fn call(
        &self,
        request: GetSubscriptionDtls,
    ) -> CallOutcome<GetSubscriptionDtlsResponse> {
        let start = Instant::now();
        let outcome = self.dispatch(request).instrument(self.span.clone()).await;
        metrics::record_call(outcome.label(), start);
        outcome
    }

    /// Like [`call`](Self::call), folding an empty response into its placeholder.
    pub async fn process_pull_request(
        &self,
        request: GetSubscriptionDtls,
    ) -> Result<GetSubscriptionDtlsResponse, ProcessingError> {
        match self.call(request).await {
            CallOutcome::Success(response) | CallOutcome::EmptyResponse(response) => Ok(response),
            CallOutcome::Failure(cause) => Err(ProcessingError { cause }),
        }
    }

    async fn dispatch(
        &self,
        request: GetSubscriptionDtls,
    ) -> CallOutcome<GetSubscriptionDtlsResponse> {
        tracing::debug!(
            customer_id = request.customer_id.as_deref().unwrap_or(""),
            service_type = request.service_type.as_deref().unwrap_or(""),
            "Processing CIS pull request"
        );
        let envelope = envelope::wrap(request, self.request_name.clone());

        tracing::debug!(endpoint = %self.request_name, "Sending request to CIS web service");
        let result = self
            .operations
            .get_subscription_details(&envelope, &self.response_name)
            .await;

        match result {
            Err(cause) => {
                tracing::error!(error = %error_chain(&cause), "Error processing CIS pull request");
                CallOutcome::Failure(cause)
            }
            Ok(response) => match envelope::unwrap(response) {
                Ok(payload) => {
                    tracing::info!(
                        status = payload.status.as_deref().unwrap_or(""),
                        services = payload.service_info_list.len(),
                        "Received response from CIS web service"
                    );
                    CallOutcome::Success(payload)
                }
                Err(_) => {
                    tracing::warn!("Received empty response from CIS web service");
                    CallOutcome::EmptyResponse(GetSubscriptionDtlsResponse::default())
                }
            },
        }
    }
}
