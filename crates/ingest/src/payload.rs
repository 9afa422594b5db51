//! Normalizer: decoded bytes to a structured event.
//!
//! # Payload Flow
//!
//! ```text
//! DecodedBytes
//!        │
//!        ▼
//! ┌─────────────────────────────┐
//! │ 1. Lossy UTF-8 decode       │
//! │    - invalid runs → U+FFFD  │
//! ├─────────────────────────────┤
//! │ 2. Empty?                   │
//! │    - yes → {}               │
//! ├─────────────────────────────┤
//! │ 3. JSON parse               │
//! │    - ok  → document         │
//! │    - err → {"raw": text}    │
//! └─────────────────────────────┘
//!        │
//!        ▼
//! NormalizedEvent
//! ```
//!
//! # Examples
//!
//! ```rust
//! use ingest::{normalize, EventKind};
//! use serde_json::json;
//!
//! let (event, _) = normalize(b"{\"a\":1}");
//! assert_eq!(event.document(), &json!({"a": 1}));
//!
//! let (event, failure) = normalize(b"hello");
//! assert_eq!(event.document(), &json!({"raw": "hello"}));
//! assert_eq!(event.kind(), EventKind::Raw);
//! assert!(failure.is_some());
//!
//! let (event, _) = normalize(b"");
//! assert_eq!(event.document(), &json!({}));
//! ```
use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::types::{EventKind, NormalizedEvent};

/// Key under which unparseable text is wrapped.
pub const RAW_KEY: &str = "raw";

/// Decodes bytes as UTF-8, replacing invalid sequences with U+FFFD.
///
/// Borrows when the input is already valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Turns decoded bytes into a [`NormalizedEvent`]. Never fails.
///
/// The second element carries the parse error when the text had to be
/// wrapped, so callers can surface it as a recovered failure.
pub fn normalize(bytes: &[u8]) -> (NormalizedEvent, Option<DecodeError>) {
    if bytes.is_empty() {
        return (
            NormalizedEvent::new(Value::Object(Map::new()), EventKind::Empty),
            None,
        );
    }

    let text = decode_text(bytes);
    match serde_json::from_str::<Value>(&text) {
        Ok(document) => (NormalizedEvent::new(document, EventKind::Parsed), None),
        Err(err) => (wrap_raw(text.into_owned()), Some(DecodeError::from(err))),
    }
}

fn wrap_raw(text: String) -> NormalizedEvent {
    let mut wrapper = Map::with_capacity(1);
    wrapper.insert(RAW_KEY.to_string(), Value::String(text));
    NormalizedEvent::new(Value::Object(wrapper), EventKind::Raw)
}
