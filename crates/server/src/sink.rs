//! Diagnostic sink for processed deliveries.
//!
//! The webhook endpoint never tells the sender how decoding went, so this is
//! the only place an operator can see it. Production wiring logs through
//! `tracing`; tests swap in [`MemorySink`].

use std::sync::Mutex;

use serde_json::Value;
use thryve::{DecodeError, DecodePath, EventKind, ProcessedDelivery};

/// One delivery as handed to a sink.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryDiagnostic<'a> {
    pub request_id: &'a str,
    pub delivery: &'a ProcessedDelivery,
}

/// Receives every processed delivery. Implementations must tolerate
/// concurrent calls; no ordering across requests is promised.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: &DeliveryDiagnostic<'_>);
}

/// Emits one structured `tracing` event per delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: &DeliveryDiagnostic<'_>) {
        let delivery = diagnostic.delivery;
        let recovered_failures = delivery
            .recovered
            .iter()
            .map(DecodeError::kind)
            .collect::<Vec<_>>()
            .join(",");

        tracing::info!(
            request_id = %diagnostic.request_id,
            decode_path = %delivery.path,
            event_kind = %delivery.event.kind(),
            body_len = delivery.body_len,
            recovered_failures = %recovered_failures,
            event = %delivery.event.document(),
            "delivery_normalized"
        );
    }
}

/// Owned copy of a recorded delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDelivery {
    pub request_id: String,
    pub path: DecodePath,
    pub kind: EventKind,
    pub event: Value,
    pub recovered: Vec<DecodeError>,
    pub body_len: usize,
}

/// Collects deliveries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<RecordedDelivery>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<RecordedDelivery> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: &DeliveryDiagnostic<'_>) {
        let delivery = diagnostic.delivery;
        let record = RecordedDelivery {
            request_id: diagnostic.request_id.to_string(),
            path: delivery.path,
            kind: delivery.event.kind(),
            event: delivery.event.document().clone(),
            recovered: delivery.recovered.clone(),
            body_len: delivery.body_len,
        };
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record);
    }
}
