//! CIS pull gateway domain.
//!
//! # Data Flow
//! ```text
//! REST JSON → GetSubscriptionDtls
//!     → service.rs (wrap, dispatch, classify)
//!     → SubscriptionOperations (SoapClient in production)
//!     → CallOutcome<GetSubscriptionDtlsResponse>
//! ```

pub mod service;
pub mod types;

pub use service::{CallOutcome, CisPullService, ProcessingError, SubscriptionOperations};
pub use types::{GetSubscriptionDtls, GetSubscriptionDtlsResponse, ServiceInfo};
