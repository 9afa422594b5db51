//! Thryve webhook decode pipeline
//!
//! Deliveries arrive here straight off the wire. The sender may post plain
//! JSON, a zstd frame, or a zstd frame wrapped in base64, and it does not
//! always tell the truth about which. We turn whatever came in into a
//! structured event and never give up on a delivery.
//!
//! ## Stages
//!
//! 1. **Dispatch** - only a `content-encoding: zstd` header with a non-empty
//!    body turns on decompression ([`wants_decompression`]).
//! 2. **Decompress** - one zstd frame, all-or-nothing, with an output ceiling
//!    ([`decompress_frame`]).
//! 3. **Unwrap and retry** - strict base64, then decompress again
//!    ([`unwrap_transport`]). If that fails too, the raw body is used as-is.
//! 4. **Normalize** - lossy UTF-8, then JSON; unparseable text becomes
//!    `{"raw": text}` and an empty body becomes `{}` ([`normalize`]).
//!
//! Stages 2 and 3 live in an ordered list ([`DECODE_STRATEGIES`]) walked by
//! [`decode_delivery`].
//!
//! ## Main entry point
//!
//! Call [`process`] with a [`RawDelivery`] and a [`DecodeConfig`]. It always
//! returns a [`ProcessedDelivery`]; failures along the way are recovered and
//! listed in `recovered` for diagnostics. [`process_observed`] runs the same
//! stages with a [`StageObserver`] called around each one.
//!
//! ## Example
//!
//! ```
//! use ingest::{process, DecodeConfig, DecodePath, RawDelivery};
//! use serde_json::json;
//!
//! let frame = zstd::encode_all(&b"{\"a\":1}"[..], 3).unwrap();
//! let delivery = RawDelivery::new(frame).with_content_encoding("zstd");
//!
//! let processed = process(delivery, &DecodeConfig::default());
//! assert_eq!(processed.path, DecodePath::Direct);
//! assert_eq!(processed.event.document(), &json!({"a": 1}));
//! ```
use std::time::Instant;

use tracing::{debug, Level};

mod codec;
mod config;
mod decode;
mod error;
mod payload;
mod transport;
mod types;

pub use crate::codec::decompress_frame;
pub use crate::config::{
    ConfigError, DecodeConfig, COMPRESSION_TOKEN, DEFAULT_MAX_DECOMPRESSED_BYTES,
};
pub use crate::decode::{decode_delivery, wants_decompression, DecodeStrategy, DECODE_STRATEGIES};
pub use crate::error::DecodeError;
pub use crate::payload::{decode_text, normalize, RAW_KEY};
pub use crate::transport::unwrap_transport;
pub use crate::types::{
    DecodeOutcome, DecodePath, DecodedBytes, EventKind, NormalizedEvent, ProcessedDelivery,
    RawDelivery,
};

/// Hooks around the two pipeline stages.
///
/// Every method defaults to a no-op. `()` is the observer that watches
/// nothing.
pub trait StageObserver {
    fn before_decode(&mut self) {}
    fn after_decode(&mut self, _outcome: &DecodeOutcome) {}
    fn before_normalize(&mut self) {}
    fn after_normalize(&mut self, _event: &NormalizedEvent, _failure: Option<&DecodeError>) {}
}

impl StageObserver for () {}

/// Runs the whole pipeline for one delivery.
pub fn process(delivery: RawDelivery, cfg: &DecodeConfig) -> ProcessedDelivery {
    process_observed(delivery, cfg, &mut ())
}

/// [`process`] with an observer called around each stage.
pub fn process_observed<O>(
    delivery: RawDelivery,
    cfg: &DecodeConfig,
    observer: &mut O,
) -> ProcessedDelivery
where
    O: StageObserver + ?Sized,
{
    let start = Instant::now();
    let body_len = delivery.body.len();

    let span = tracing::span!(
        Level::DEBUG,
        "ingest.process",
        body_len,
        content_encoding = ?delivery.content_encoding
    );
    let _guard = span.enter();

    observer.before_decode();
    let outcome = decode_delivery(&delivery, cfg);
    observer.after_decode(&outcome);

    let DecodeOutcome {
        bytes,
        path,
        mut recovered,
    } = outcome;

    observer.before_normalize();
    let (event, parse_failure) = normalize(&bytes);
    observer.after_normalize(&event, parse_failure.as_ref());
    recovered.extend(parse_failure);

    debug!(
        decode_path = %path,
        event_kind = %event.kind(),
        decoded_len = bytes.len(),
        recovered = recovered.len(),
        elapsed_micros = start.elapsed().as_micros(),
        "process_complete"
    );

    ProcessedDelivery {
        event,
        path,
        recovered,
        body_len,
    }
}
