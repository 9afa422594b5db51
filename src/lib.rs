//! Umbrella crate for the Thryve webhook receiver.
//!
//! Re-exports the decode pipeline from the `ingest` crate and adds
//! [`process_delivery`], which runs the stages in order while reporting
//! per-stage latency to an optional, process-wide [`PipelineMetrics`]
//! observer.

pub use ingest::{
    COMPRESSION_TOKEN, ConfigError, DECODE_STRATEGIES, DEFAULT_MAX_DECOMPRESSED_BYTES,
    DecodeConfig, DecodeError, DecodeOutcome, DecodePath, DecodeStrategy, DecodedBytes, EventKind,
    NormalizedEvent, ProcessedDelivery, RAW_KEY, RawDelivery, StageObserver, decode_delivery,
    decode_text, decompress_frame, normalize, process_observed, unwrap_transport,
    wants_decompression,
};

use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    /// Called once per delivery after stages 1–3.
    fn record_decode(&self, latency: Duration, path: DecodePath, recovered: &[DecodeError]);
    /// Called once per delivery after the normalizer, with its parse failure
    /// if the text had to be wrapped.
    fn record_normalize(&self, latency: Duration, kind: EventKind, failure: Option<&DecodeError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Times each stage and forwards it to the installed recorder.
struct StageTimer {
    recorder: Arc<dyn PipelineMetrics>,
    stage_start: Instant,
}

impl StageObserver for StageTimer {
    fn before_decode(&mut self) {
        self.stage_start = Instant::now();
    }

    fn after_decode(&mut self, outcome: &DecodeOutcome) {
        self.recorder
            .record_decode(self.stage_start.elapsed(), outcome.path, &outcome.recovered);
    }

    fn before_normalize(&mut self) {
        self.stage_start = Instant::now();
    }

    fn after_normalize(&mut self, event: &NormalizedEvent, failure: Option<&DecodeError>) {
        self.recorder
            .record_normalize(self.stage_start.elapsed(), event.kind(), failure);
    }
}

/// Run dispatch, decode and normalization for one delivery.
///
/// Total: every input produces a [`ProcessedDelivery`]. Same stages as
/// [`ingest::process`], timed for the recorder installed with
/// [`set_pipeline_metrics`].
pub fn process_delivery(raw: RawDelivery, cfg: &DecodeConfig) -> ProcessedDelivery {
    match metrics_recorder() {
        Some(recorder) => {
            let mut timer = StageTimer {
                recorder,
                stage_start: Instant::now(),
            };
            process_observed(raw, cfg, &mut timer)
        }
        None => ingest::process(raw, cfg),
    }
}

/// Convenience wrapper over [`process_delivery`] with default configuration.
pub fn process_body(
    body: impl Into<bytes::Bytes>,
    content_encoding: Option<&str>,
) -> ProcessedDelivery {
    let mut raw = RawDelivery::new(body);
    if let Some(token) = content_encoding {
        raw = raw.with_content_encoding(token);
    }
    process_delivery(raw, &DecodeConfig::default())
}
