//! CIS subscription lookup payloads.
//!
//! The same structs bind both sides of the gateway: camelCase JSON from REST
//! callers and the child elements of the SOAP request and response elements.

use serde::{Deserialize, Serialize};

/// Request to look up a customer's subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSubscriptionDtls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Subscription details returned by CIS.
///
/// `Default` is the empty placeholder returned when CIS sends no payload or
/// the call fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSubscriptionDtlsResponse {
    #[serde(default)]
    pub request_id: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub service_info_list: Vec<ServiceInfo>,
}

/// One subscribed service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    #[serde(default)]
    pub service_id: Option<String>,

    #[serde(default)]
    pub service_name: Option<String>,

    #[serde(default)]
    pub service_status: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}
