//! Encoding dispatch and the ordered decode chain.
//!
//! The chain is data, not control flow: [`DECODE_STRATEGIES`] lists the
//! fallible strategies in priority order and [`decode_delivery`] walks it,
//! stopping at the first success. Falling off the end of the list means the
//! raw body is used unchanged, which is the only infallible step.
use tracing::{debug, warn};

use crate::codec::decompress_frame;
use crate::config::{DecodeConfig, COMPRESSION_TOKEN};
use crate::error::DecodeError;
use crate::transport::unwrap_transport;
use crate::types::{DecodeOutcome, DecodePath, DecodedBytes, RawDelivery};

/// One fallible way of turning the raw body into decoded bytes.
#[derive(Clone, Copy)]
pub struct DecodeStrategy {
    /// Path reported when this strategy succeeds.
    pub path: DecodePath,
    /// Whether the strategy runs under the given configuration.
    pub enabled: fn(&DecodeConfig) -> bool,
    /// The decode step itself.
    pub run: fn(&[u8], &DecodeConfig) -> Result<Vec<u8>, DecodeError>,
}

impl std::fmt::Debug for DecodeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeStrategy")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Strategies tried, in order, once the dispatcher has asked for decompression.
pub const DECODE_STRATEGIES: &[DecodeStrategy] = &[
    DecodeStrategy {
        path: DecodePath::Direct,
        enabled: always,
        run: decompress_direct,
    },
    DecodeStrategy {
        path: DecodePath::TransportWrapped,
        enabled: transport_fallback_enabled,
        run: decompress_wrapped,
    },
];

fn always(_: &DecodeConfig) -> bool {
    true
}

fn transport_fallback_enabled(cfg: &DecodeConfig) -> bool {
    cfg.transport_fallback
}

fn decompress_direct(body: &[u8], cfg: &DecodeConfig) -> Result<Vec<u8>, DecodeError> {
    decompress_frame(body, cfg.max_decompressed_bytes)
}

fn decompress_wrapped(body: &[u8], cfg: &DecodeConfig) -> Result<Vec<u8>, DecodeError> {
    let unwrapped = unwrap_transport(body)?;
    decompress_frame(&unwrapped, cfg.max_decompressed_bytes)
}

/// Encoding dispatcher.
///
/// Returns true only when the declared encoding is the compression token
/// (case-insensitive, surrounding whitespace ignored) and there is a body to
/// decode.
///
/// ```rust
/// use ingest::wants_decompression;
///
/// assert!(wants_decompression(Some("ZSTD"), b"\x28\xb5\x2f\xfd"));
/// assert!(!wants_decompression(Some("gzip"), b"\x1f\x8b"));
/// assert!(!wants_decompression(None, b"{}"));
/// assert!(!wants_decompression(Some("zstd"), b""));
/// ```
pub fn wants_decompression(content_encoding: Option<&str>, body: &[u8]) -> bool {
    if body.is_empty() {
        return false;
    }
    content_encoding
        .map(|token| token.trim().eq_ignore_ascii_case(COMPRESSION_TOKEN))
        .unwrap_or(false)
}

/// Runs stages 1–3 for a delivery. Never fails.
pub fn decode_delivery(delivery: &RawDelivery, cfg: &DecodeConfig) -> DecodeOutcome {
    let body = &delivery.body;

    if !wants_decompression(delivery.content_encoding.as_deref(), body) {
        return DecodeOutcome {
            bytes: DecodedBytes::from(body.clone()),
            path: DecodePath::Passthrough,
            recovered: Vec::new(),
        };
    }

    let mut recovered = Vec::new();
    for strategy in DECODE_STRATEGIES.iter().filter(|s| (s.enabled)(cfg)) {
        match (strategy.run)(body, cfg) {
            Ok(decoded) => {
                debug!(
                    decode_path = %strategy.path,
                    body_len = body.len(),
                    decoded_len = decoded.len(),
                    "decode_strategy_succeeded"
                );
                return DecodeOutcome {
                    bytes: DecodedBytes::from(decoded),
                    path: strategy.path,
                    recovered,
                };
            }
            Err(err) => {
                debug!(
                    decode_path = %strategy.path,
                    error = %err,
                    "decode_strategy_failed"
                );
                recovered.push(err);
            }
        }
    }

    warn!(
        body_len = body.len(),
        attempts = recovered.len(),
        "decode_fallback_raw"
    );
    DecodeOutcome {
        bytes: DecodedBytes::from(body.clone()),
        path: DecodePath::RawFallback,
        recovered,
    }
}
