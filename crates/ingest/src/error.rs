//! Error types produced while decoding a webhook delivery.
//!
//! None of these errors ever leave the pipeline as a failure. Every variant is
//! recovered by the next strategy in the decode chain (or by the normalizer's
//! raw-text wrapper) and is only kept around so the caller can report what
//! happened on the way to the final event.
//!
//! # Error Categories
//!
//! | Error | Stage | Recovery |
//! |-------|-------|----------|
//! | [`CorruptStream`](DecodeError::CorruptStream) | Compression decoder | Next strategy, then raw bytes |
//! | [`DecompressedTooLarge`](DecodeError::DecompressedTooLarge) | Compression decoder | Same as `CorruptStream` |
//! | [`TransportDecodeFailure`](DecodeError::TransportDecodeFailure) | Transport fallback | Raw bytes |
//! | [`StructureParseFailure`](DecodeError::StructureParseFailure) | Normalizer | `{"raw": text}` wrapper |
//! | [`BodyTooLarge`](DecodeError::BodyTooLarge) | Intake (before any stage) | Empty event `{}` |
//!
//! # Examples
//!
//! ```rust
//! use ingest::DecodeError;
//!
//! fn describe(error: &DecodeError) -> &'static str {
//!     match error {
//!         DecodeError::CorruptStream(_) | DecodeError::DecompressedTooLarge { .. } => {
//!             "payload was not a usable zstd frame"
//!         }
//!         DecodeError::TransportDecodeFailure(_) => "payload was not base64",
//!         DecodeError::StructureParseFailure(_) => "payload was not JSON",
//!         _ => "unknown",
//!     }
//! }
//!
//! let err = DecodeError::TransportDecodeFailure("Invalid byte 33, offset 0.".into());
//! assert_eq!(describe(&err), "payload was not base64");
//! ```
use thiserror::Error;

/// Recoverable failures observed by the decode chain.
///
/// All variants are cloneable and comparable so that recorded failures can be
/// attached to a [`ProcessedDelivery`](crate::ProcessedDelivery) and asserted
/// on in tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// The input was not a complete, valid zstd frame.
    ///
    /// Covers malformed headers, truncated frames, checksum mismatches, an
    /// empty input and trailing bytes after the frame.
    #[error("corrupt compressed stream: {0}")]
    CorruptStream(String),

    /// The frame decompressed past the configured output ceiling.
    ///
    /// Treated by the chain exactly like [`DecodeError::CorruptStream`].
    #[error("decompressed output exceeds limit of {limit} bytes")]
    DecompressedTooLarge {
        /// The ceiling that was hit, in bytes.
        limit: usize,
    },

    /// Strict base64 decoding rejected the body.
    #[error("transport decode failure: {0}")]
    TransportDecodeFailure(String),

    /// Decoded text was not a JSON document.
    #[error("structure parse failure: {0}")]
    StructureParseFailure(String),

    /// The request body was larger than the configured intake cap, so it was
    /// never read in full and no stage ran.
    #[error("request body exceeds intake limit of {limit} bytes")]
    BodyTooLarge {
        /// The cap that was hit, in bytes.
        limit: usize,
    },
}

impl DecodeError {
    /// Returns true when the error came from the compression decoder.
    ///
    /// ```rust
    /// use ingest::DecodeError;
    ///
    /// assert!(DecodeError::DecompressedTooLarge { limit: 1024 }.is_compression_failure());
    /// assert!(!DecodeError::StructureParseFailure("eof".into()).is_compression_failure());
    /// ```
    pub fn is_compression_failure(&self) -> bool {
        matches!(
            self,
            DecodeError::CorruptStream(_) | DecodeError::DecompressedTooLarge { .. }
        )
    }

    /// Short stable label, suitable for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::CorruptStream(_) => "corrupt_stream",
            DecodeError::DecompressedTooLarge { .. } => "decompressed_too_large",
            DecodeError::TransportDecodeFailure(_) => "transport_decode_failure",
            DecodeError::StructureParseFailure(_) => "structure_parse_failure",
            DecodeError::BodyTooLarge { .. } => "body_too_large",
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::CorruptStream(err.to_string())
    }
}

impl From<base64::DecodeError> for DecodeError {
    fn from(err: base64::DecodeError) -> Self {
        DecodeError::TransportDecodeFailure(err.to_string())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::StructureParseFailure(err.to_string())
    }
}
