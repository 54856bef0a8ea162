//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cis_gateway_calls_total` (counter): CIS calls by outcome
//!   (`success`, `empty`, `failure`)
//! - `cis_gateway_call_duration_seconds` (histogram): end-to-end call latency
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

pub const CALLS_TOTAL: &str = "cis_gateway_calls_total";
pub const CALL_DURATION: &str = "cis_gateway_call_duration_seconds";

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished CIS call.
pub fn record_call(outcome: &'static str, start: Instant) {
    ::metrics::counter!(CALLS_TOTAL, "outcome" => outcome).increment(1);
    ::metrics::histogram!(CALL_DURATION).record(start.elapsed().as_secs_f64());
}
