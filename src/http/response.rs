//! Mapping call outcomes to REST responses.
//!
//! | Outcome         | Status | Body                         |
//! |-----------------|--------|------------------------------|
//! | `Success`       | 200    | CIS response payload         |
//! | `EmptyResponse` | 200    | empty-valued payload         |
//! | `Failure`       | 500    | empty-valued payload         |
//!
//! Every response carries `x-cis-outcome` so callers can tell an empty CIS
//! answer from a populated one without inspecting the body.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::cis::{CallOutcome, GetSubscriptionDtlsResponse};

pub const X_CIS_OUTCOME: &str = "x-cis-outcome";

impl IntoResponse for CallOutcome<GetSubscriptionDtlsResponse> {
    fn into_response(self) -> Response {
        let outcome = [(
            HeaderName::from_static(X_CIS_OUTCOME),
            HeaderValue::from_static(self.label()),
        )];

        match self {
            CallOutcome::Success(payload) | CallOutcome::EmptyResponse(payload) => {
                (StatusCode::OK, outcome, Json(payload)).into_response()
            }
            CallOutcome::Failure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                outcome,
                Json(GetSubscriptionDtlsResponse::default()),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::{GatewayError, SoapFault};

    #[test]
    fn failure_is_500_with_outcome_header() {
        let response = CallOutcome::<GetSubscriptionDtlsResponse>::Failure(GatewayError::Fault(
            SoapFault::default(),
        ))
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[X_CIS_OUTCOME], "failure");
    }

    #[test]
    fn empty_response_is_200() {
        let response =
            CallOutcome::EmptyResponse(GetSubscriptionDtlsResponse::default()).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_CIS_OUTCOME], "empty");
        assert_eq!(response.headers()["content-type"], "application/json");
    }
}
