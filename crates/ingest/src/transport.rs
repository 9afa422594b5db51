//! Transport unwrapping for senders that base64 their compressed frames.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::DecodeError;

/// Strict standard-alphabet base64 decode.
///
/// Padding is required and anything outside the alphabet (including
/// whitespace and line breaks) is rejected.
///
/// ```rust
/// assert_eq!(ingest::unwrap_transport(b"aGVsbG8=").unwrap(), b"hello");
/// assert!(ingest::unwrap_transport(b"aGVsbG8").is_err());
/// assert!(ingest::unwrap_transport(b"aGVs bG8=").is_err());
/// ```
pub fn unwrap_transport(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    Ok(STANDARD.decode(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_url_safe_alphabet() {
        // '-' and '_' only exist in the URL-safe alphabet.
        assert!(matches!(
            unwrap_transport(b"-_-_"),
            Err(DecodeError::TransportDecodeFailure(_))
        ));
    }

    #[test]
    fn rejects_trailing_newline() {
        assert!(unwrap_transport(b"aGVsbG8=\n").is_err());
    }

    #[test]
    fn rejects_json_text() {
        assert!(unwrap_transport(br#"{"a":1}"#).is_err());
    }

    #[test]
    fn decodes_binary() {
        let encoded = STANDARD.encode([0x28u8, 0xb5, 0x2f, 0xfd, 0x00]);
        assert_eq!(
            unwrap_transport(encoded.as_bytes()).expect("decode"),
            vec![0x28, 0xb5, 0x2f, 0xfd, 0x00]
        );
    }
}
