//! REST contract of `POST /api/cis/pull` against stubbed CIS operations.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use cis_gateway::cis::{GetSubscriptionDtls, GetSubscriptionDtlsResponse, ServiceInfo, SubscriptionOperations};
use cis_gateway::config::GatewayConfig;
use cis_gateway::http::{HttpServer, X_CIS_OUTCOME, X_REQUEST_ID};
use cis_gateway::soap::envelope;
use cis_gateway::soap::{GatewayError, QualifiedEnvelope, QualifiedName};
use cis_gateway::transport::TransportError;

mod common;

enum Reply {
    Value(GetSubscriptionDtlsResponse),
    Nothing,
    Fail(&'static str),
}

struct StubOperations {
    reply: Reply,
    received: Mutex<Vec<GetSubscriptionDtls>>,
}

impl StubOperations {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            received: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SubscriptionOperations for StubOperations {
    async fn get_subscription_details(
        &self,
        request: &QualifiedEnvelope<GetSubscriptionDtls>,
        response_name: &QualifiedName,
    ) -> Result<Option<QualifiedEnvelope<GetSubscriptionDtlsResponse>>, GatewayError> {
        if let Some(value) = request.value() {
            self.received.lock().unwrap().push(value.clone());
        }
        match &self.reply {
            Reply::Value(v) => Ok(Some(envelope::wrap(v.clone(), response_name.clone()))),
            Reply::Nothing => Ok(None),
            Reply::Fail(msg) => Err(TransportError::Request((*msg).into()).into()),
        }
    }
}

fn populated() -> GetSubscriptionDtlsResponse {
    GetSubscriptionDtlsResponse {
        request_id: Some("REQ-1".into()),
        status: Some("SUCCESS".into()),
        message: Some("Subscriptions found".into()),
        timestamp: Some("2024-05-01T10:15:30Z".into()),
        service_info_list: vec![ServiceInfo {
            service_id: Some("SVC-001".into()),
            service_name: Some("Mobile Postpaid".into()),
            service_status: Some("ACTIVE".into()),
            description: None,
        }],
    }
}

fn server(operations: Arc<StubOperations>) -> HttpServer {
    HttpServer::with_operations(GatewayConfig::default(), operations)
}

const LOOKUP: &str = r#"{"customerId":"CUST12345","serviceType":"MOBILE"}"#;

#[tokio::test]
async fn test_populated_response_is_returned() {
    let stub = StubOperations::new(Reply::Value(populated()));
    let app = server(stub.clone()).router();

    let response = app.oneshot(common::pull_request(LOOKUP)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[X_CIS_OUTCOME], "success");
    assert!(response.headers().contains_key(X_REQUEST_ID));

    let body = common::json_body(response).await;
    assert_eq!(body, serde_json::to_value(populated()).unwrap());
    assert_eq!(body["serviceInfoList"][0]["serviceId"], "SVC-001");

    let received = stub.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].customer_id.as_deref(), Some("CUST12345"));
    assert_eq!(received[0].service_type.as_deref(), Some("MOBILE"));
}

#[tokio::test]
async fn test_service_error_is_500() {
    let app = server(StubOperations::new(Reply::Fail("SOAP service unavailable"))).router();

    let response = app.oneshot(common::pull_request(LOOKUP)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[X_CIS_OUTCOME], "failure");
    let body = common::json_body(response).await;
    assert_eq!(body, serde_json::to_value(GetSubscriptionDtlsResponse::default()).unwrap());
}

#[tokio::test]
async fn test_empty_response_is_200_with_placeholder() {
    let app = server(StubOperations::new(Reply::Nothing)).router();

    let response = app.oneshot(common::pull_request(LOOKUP)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[X_CIS_OUTCOME], "empty");
    let body = common::json_body(response).await;
    assert!(body["status"].is_null());
    assert_eq!(body["serviceInfoList"], serde_json::json!([]));
}

#[tokio::test]
async fn test_empty_json_object_is_accepted() {
    let stub = StubOperations::new(Reply::Value(populated()));
    let app = server(stub.clone()).router();

    let response = app.oneshot(common::pull_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(stub.received.lock().unwrap()[0], GetSubscriptionDtls::default());
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let stub = StubOperations::new(Reply::Value(populated()));
    let app = server(stub.clone()).router();

    let response = app.oneshot(common::pull_request("{ invalid json }")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(stub.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_is_405() {
    let app = server(StubOperations::new(Reply::Nothing)).router();

    let request = Request::builder()
        .method("GET")
        .uri("/api/cis/pull")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_missing_content_type_is_415() {
    let app = server(StubOperations::new(Reply::Nothing)).router();

    let request = Request::builder()
        .method("POST")
        .uri("/api/cis/pull")
        .body(Body::from(LOOKUP))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_caller_request_id_is_echoed() {
    let app = server(StubOperations::new(Reply::Nothing)).router();

    let mut request = common::pull_request(LOOKUP);
    request
        .headers_mut()
        .insert(X_REQUEST_ID, "caller-supplied-id".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()[X_REQUEST_ID], "caller-supplied-id");
}

#[tokio::test]
async fn test_health_reports_up() {
    let app = server(StubOperations::new(Reply::Nothing)).router();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::json_body(response).await;
    assert_eq!(body["status"], "UP");
    assert_eq!(body["service"], "cis-gateway");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = GatewayConfig::default();
    config.security.max_body_size = 16;
    let app = HttpServer::with_operations(config, StubOperations::new(Reply::Nothing)).router();

    let response = app.oneshot(common::pull_request(LOOKUP)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
