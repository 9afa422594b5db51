use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::sink::{DiagnosticSink, TracingSink};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Where processed deliveries are surfaced
    pub sink: Arc<dyn DiagnosticSink>,

    /// Prometheus render handle, present once the recorder is installed
    pub prometheus: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state that logs deliveries through `tracing`
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Create server state with an explicit diagnostic sink
    pub fn with_sink(config: ServerConfig, sink: Arc<dyn DiagnosticSink>) -> ServerResult<Self> {
        config.decode.validate()?;

        Ok(Self {
            config: Arc::new(config),
            sink,
            prometheus: None,
        })
    }

    /// Attach the Prometheus handle used by `/metrics`
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
