//! REST handlers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::cis::{CallOutcome, GetSubscriptionDtls, GetSubscriptionDtlsResponse};
use crate::http::request::request_id;
use crate::http::server::AppState;

pub const SERVICE_NAME: &str = "cis-gateway";

/// `POST /api/cis/pull`
///
/// Malformed JSON, a wrong method or a missing JSON content type are rejected
/// by axum before this runs (400, 405 and 415).
pub async fn pull_customer_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GetSubscriptionDtls>,
) -> CallOutcome<GetSubscriptionDtlsResponse> {
    tracing::info!(
        request_id = %request_id(&headers),
        customer_id = request.customer_id.as_deref().unwrap_or(""),
        "Received CIS pull request"
    );
    state.service.call(request).await
}

/// Liveness report for `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub service: String,
    pub version: String,
    pub status: String,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "UP".to_string(),
    })
}
