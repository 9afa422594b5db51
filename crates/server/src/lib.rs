//! Thryve Webhook Server - HTTP intake for Thryve deliveries
//!
//! Accepts webhook deliveries whose bodies may be plain JSON, a zstd frame, or
//! a base64-wrapped zstd frame, normalizes them with the `thryve` pipeline and
//! always acknowledges with `200 {"status": "ok"}`.
//!
//! # Features
//!
//! - **Always acknowledge**: decode and parse failures never change the response
//! - **Diagnostics**: every normalized event goes to a pluggable [`DiagnosticSink`]
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Metrics**: Prometheus exposition of decode paths and stage latency
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /webhooks/thryve` - Delivery intake (path configurable)
//! - `GET /` - Service information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod sink;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use sink::{DeliveryDiagnostic, DiagnosticSink, MemorySink, RecordedDelivery, TracingSink};
pub use state::ServerState;
