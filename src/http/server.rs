//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the pull and health endpoints
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Build the SOAP client and CIS service from configuration
//! - Serve until shutdown is signalled

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cis::{CisPullService, SubscriptionOperations};
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::MakeRequestUuid;
use crate::lifecycle::shutdown;
use crate::soap::{GatewayError, SoapClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CisPullService>,
}

/// HTTP server for the CIS gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server that calls the configured CIS endpoint over SOAP.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = SoapClient::from_config(&config.webservice)?;
        Ok(Self::with_operations(config, Arc::new(client)))
    }

    /// Create a server backed by the given operations.
    pub fn with_operations(
        config: GatewayConfig,
        operations: Arc<dyn SubscriptionOperations>,
    ) -> Self {
        let service = Arc::new(CisPullService::new(operations, &config.webservice));
        let router = Self::build_router(&config, AppState { service });
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/cis/pull", post(handlers::pull_customer_info))
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoint = %self.config.webservice.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::stopped(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
