//! Logging and Prometheus wiring.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thryve::{DecodeError, DecodePath, EventKind, PipelineMetrics};

/// Forwards pipeline stage observations to the `metrics` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsBridge;

impl PipelineMetrics for MetricsBridge {
    fn record_decode(&self, latency: Duration, path: DecodePath, recovered: &[DecodeError]) {
        counter!("webhook_deliveries_total", "decode_path" => path.as_str()).increment(1);
        histogram!("webhook_decode_seconds").record(latency.as_secs_f64());
        recovered.iter().for_each(count_recovered);
    }

    fn record_normalize(&self, latency: Duration, kind: EventKind, failure: Option<&DecodeError>) {
        counter!("webhook_events_total", "event_kind" => kind.as_str()).increment(1);
        histogram!("webhook_normalize_seconds").record(latency.as_secs_f64());
        if let Some(failure) = failure {
            count_recovered(failure);
        }
    }
}

fn count_recovered(failure: &DecodeError) {
    counter!("webhook_recovered_failures_total", "kind" => failure.kind()).increment(1);
}

/// Installs the global Prometheus recorder and hooks the pipeline into it.
///
/// Can only succeed once per process.
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    thryve::set_pipeline_metrics(Some(Arc::new(MetricsBridge)));
    Ok(handle)
}

/// Structured JSON logs filtered by `log_level` (any `EnvFilter` directive).
pub fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();
}
