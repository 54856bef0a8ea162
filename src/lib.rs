//! CIS pull gateway library.

pub mod cis;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod soap;
pub mod transport;

pub use cis::CisPullService;
pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
