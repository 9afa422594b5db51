//! Data model for a delivery moving through the decode pipeline.
//!
//! ```text
//! RawDelivery { body, content_encoding }
//!        │
//!        ▼  decode_delivery()
//! DecodeOutcome { bytes: DecodedBytes, path: DecodePath, recovered }
//!        │
//!        ▼  normalize()
//! NormalizedEvent { document, kind }
//!        │
//!        ▼
//! ProcessedDelivery { event, path, recovered, body_len }
//! ```
//!
//! Every value here is immutable once built. [`Bytes`] keeps the passthrough
//! and raw-fallback paths zero-copy.
use std::fmt;
use std::ops::Deref;

use bytes::Bytes;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// One inbound webhook request, reduced to what the pipeline looks at.
///
/// # Examples
///
/// ```rust
/// use ingest::RawDelivery;
///
/// let delivery = RawDelivery::new(&b"{\"a\":1}"[..]).with_content_encoding("zstd");
/// assert_eq!(delivery.content_encoding.as_deref(), Some("zstd"));
/// assert_eq!(delivery.body.len(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDelivery {
    /// Request body exactly as received.
    pub body: Bytes,
    /// Declared `content-encoding` header value, if any.
    pub content_encoding: Option<String>,
}

impl RawDelivery {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            content_encoding: None,
        }
    }

    pub fn with_content_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.content_encoding = Some(encoding.into());
        self
    }
}

/// Output of the decode chain: the bytes handed to the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedBytes(Bytes);

impl DecodedBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for DecodedBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for DecodedBytes {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for DecodedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

/// Which route through the decode chain produced the final bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePath {
    /// Compression handling was not requested, or the body was empty.
    Passthrough,
    /// The body was a zstd frame.
    Direct,
    /// The body was a base64-wrapped zstd frame.
    TransportWrapped,
    /// Every strategy failed; the raw body is used as-is.
    RawFallback,
}

impl DecodePath {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodePath::Passthrough => "passthrough",
            DecodePath::Direct => "direct",
            DecodePath::TransportWrapped => "transport_wrapped",
            DecodePath::RawFallback => "raw_fallback",
        }
    }
}

impl fmt::Display for DecodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of stages 1–3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutcome {
    pub bytes: DecodedBytes,
    pub path: DecodePath,
    /// Failures the chain recovered from, in the order they happened.
    pub recovered: Vec<DecodeError>,
}

/// How the normalizer arrived at its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The text parsed as JSON.
    Parsed,
    /// The text did not parse and was wrapped as `{"raw": text}`.
    Raw,
    /// The decoded bytes were empty.
    Empty,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Parsed => "parsed",
            EventKind::Raw => "raw",
            EventKind::Empty => "empty",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured document produced for a delivery.
///
/// Serializes as the bare document; `kind` is diagnostic metadata only.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    document: Value,
    kind: EventKind,
}

impl NormalizedEvent {
    pub(crate) fn new(document: Value, kind: EventKind) -> Self {
        Self { document, kind }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn into_document(self) -> Value {
        self.document
    }
}

impl Serialize for NormalizedEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

impl PartialEq<Value> for NormalizedEvent {
    fn eq(&self, other: &Value) -> bool {
        self.document == *other
    }
}

/// Everything the pipeline learned about one delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDelivery {
    pub event: NormalizedEvent,
    pub path: DecodePath,
    /// Recovered failures from decoding and normalization, in order.
    pub recovered: Vec<DecodeError>,
    /// Length of the raw request body in bytes.
    pub body_len: usize,
}

impl ProcessedDelivery {
    /// Stand-in for a delivery whose body was over the intake cap.
    ///
    /// The body was never read in full, so the event is empty and `body_len`
    /// is the cap itself.
    pub fn oversized(limit: usize) -> Self {
        Self {
            event: NormalizedEvent::new(Value::Object(Map::new()), EventKind::Empty),
            path: DecodePath::Passthrough,
            recovered: vec![DecodeError::BodyTooLarge { limit }],
            body_len: limit,
        }
    }
}
