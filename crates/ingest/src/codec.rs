//! Compression decoder (zstd).
//!
//! Decoding is all-or-nothing for one frame: either the whole frame is
//! decoded and nothing follows it, or the call fails and no partial output
//! escapes.
use std::io::Read;

use zstd::stream::read::Decoder;

use crate::error::DecodeError;

/// Decompresses a single zstd frame, honouring an optional output ceiling.
///
/// ```rust
/// let frame = zstd::encode_all(&b"{\"a\":1}"[..], 3).unwrap();
/// let out = ingest::decompress_frame(&frame, Some(1024)).unwrap();
/// assert_eq!(out, b"{\"a\":1}");
///
/// assert!(ingest::decompress_frame(b"not a frame", None).is_err());
/// ```
pub fn decompress_frame(input: &[u8], limit: Option<usize>) -> Result<Vec<u8>, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::CorruptStream("empty input".into()));
    }

    let mut decoder = Decoder::with_buffer(input)?.single_frame();
    let mut out = Vec::new();

    let remainder = match limit {
        Some(limit) => {
            // One byte of headroom is enough to tell "exactly at the limit"
            // from "past it" without buffering the rest of the frame.
            let mut limited = decoder.take((limit as u64).saturating_add(1));
            limited.read_to_end(&mut out)?;
            if out.len() > limit {
                return Err(DecodeError::DecompressedTooLarge { limit });
            }
            limited.into_inner().finish()
        }
        None => {
            decoder.read_to_end(&mut out)?;
            decoder.finish()
        }
    };

    if !remainder.is_empty() {
        return Err(DecodeError::CorruptStream(format!(
            "{} trailing bytes after frame",
            remainder.len()
        )));
    }

    Ok(out)
}
