//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Components log within their injected span:
//!     → logging.rs (EnvFilter + pretty/JSON fmt layer)
//!
//! CisPullService, per call:
//!     → metrics.rs (outcome counter, latency histogram)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
