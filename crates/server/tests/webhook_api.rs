//! HTTP tests for the webhook endpoint and the public routes.
//!
//! Requests go through the full router (middleware included) with
//! `tower::ServiceExt::oneshot`; decode outcomes are checked through the
//! in-memory diagnostic sink since the response never reveals them.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::error::ErrorResponse;
use server::{build_router, MemorySink, ServerConfig, ServerState};
use thryve::{DecodeError, DecodePath, EventKind};
use tower::ServiceExt;

const WEBHOOK: &str = "/webhooks/thryve";

fn test_app_with(config: ServerConfig) -> (Router, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let state = ServerState::with_sink(config, sink.clone()).expect("Failed to create test state");
    (build_router(Arc::new(state)), sink)
}

fn test_app() -> (Router, Arc<MemorySink>) {
    test_app_with(ServerConfig::default())
}

fn delivery(body: impl Into<Body>, encoding: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(WEBHOOK);
    if let Some(token) = encoding {
        builder = builder.header("content-encoding", token);
    }
    builder.body(body.into()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn zstd_json(doc: &Value) -> Vec<u8> {
    zstd::encode_all(serde_json::to_vec(doc).unwrap().as_slice(), 3).unwrap()
}

fn assert_acknowledged(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, &json!({"status": "ok"}));
}

#[tokio::test]
async fn plain_json_is_acknowledged_and_parsed() {
    let (app, sink) = test_app();
    let (status, body) = send(app, delivery(r#"{"a":1}"#, None)).await;

    assert_acknowledged(status, &body);
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event, json!({"a": 1}));
    assert_eq!(records[0].path, DecodePath::Passthrough);
}

#[tokio::test]
async fn zstd_body_is_decompressed() {
    let (app, sink) = test_app();
    let (status, body) = send(app, delivery(zstd_json(&json!({"a": 1})), Some("zstd"))).await;

    assert_acknowledged(status, &body);
    let record = &sink.records()[0];
    assert_eq!(record.event, json!({"a": 1}));
    assert_eq!(record.path, DecodePath::Direct);
}

#[tokio::test]
async fn uppercase_header_is_recognized() {
    let (app, sink) = test_app();
    let (status, body) = send(app, delivery(zstd_json(&json!({"a": 1})), Some("ZSTD"))).await;

    assert_acknowledged(status, &body);
    assert_eq!(sink.records()[0].path, DecodePath::Direct);
}

#[tokio::test]
async fn base64_wrapped_zstd_is_unwrapped() {
    let (app, sink) = test_app();
    let wrapped = STANDARD.encode(zstd_json(&json!({"a": 1})));
    let (status, body) = send(app, delivery(wrapped, Some("zstd"))).await;

    assert_acknowledged(status, &body);
    let record = &sink.records()[0];
    assert_eq!(record.event, json!({"a": 1}));
    assert_eq!(record.path, DecodePath::TransportWrapped);
}

#[tokio::test]
async fn non_json_text_is_wrapped_raw() {
    let (app, sink) = test_app();
    let (status, body) = send(app, delivery("hello", None)).await;

    assert_acknowledged(status, &body);
    let record = &sink.records()[0];
    assert_eq!(record.event, json!({"raw": "hello"}));
    assert_eq!(record.kind, EventKind::Raw);
}

#[tokio::test]
async fn garbage_with_header_falls_back_to_raw_bytes() {
    let (app, sink) = test_app();
    let (status, body) = send(app, delivery(&b"\x01\x02 not a frame"[..], Some("zstd"))).await;

    assert_acknowledged(status, &body);
    let record = &sink.records()[0];
    assert_eq!(record.path, DecodePath::RawFallback);
    assert_eq!(record.event, json!({"raw": "\u{1}\u{2} not a frame"}));
    assert!(matches!(
        record.recovered.as_slice(),
        [
            DecodeError::CorruptStream(_),
            DecodeError::TransportDecodeFailure(_),
            DecodeError::StructureParseFailure(_)
        ]
    ));
}

#[tokio::test]
async fn empty_body_yields_empty_event() {
    for encoding in [None, Some("zstd")] {
        let (app, sink) = test_app();
        let (status, body) = send(app, delivery(Body::empty(), encoding)).await;

        assert_acknowledged(status, &body);
        let record = &sink.records()[0];
        assert_eq!(record.event, json!({}));
        assert_eq!(record.kind, EventKind::Empty);
        assert_eq!(record.body_len, 0);
    }
}

#[tokio::test]
async fn compressed_body_without_header_is_not_decompressed() {
    let (app, sink) = test_app();
    let (status, body) = send(app, delivery(zstd_json(&json!({"a": 1})), Some("gzip"))).await;

    assert_acknowledged(status, &body);
    let record = &sink.records()[0];
    assert_eq!(record.path, DecodePath::Passthrough);
    assert_eq!(record.kind, EventKind::Raw);
}

#[tokio::test]
async fn non_ascii_header_is_treated_as_absent() {
    let (app, sink) = test_app();
    let mut request = delivery(zstd_json(&json!({"a": 1})), None);
    request.headers_mut().insert(
        "content-encoding",
        HeaderValue::from_bytes(b"zs\xfftd").unwrap(),
    );
    let (status, body) = send(app, request).await;

    assert_acknowledged(status, &body);
    assert_eq!(sink.records()[0].path, DecodePath::Passthrough);
}

#[tokio::test]
async fn decompression_ceiling_still_acknowledges() {
    let mut config = ServerConfig::default();
    config.decode.max_decompressed_bytes = Some(1024);
    let (app, sink) = test_app_with(config);

    let big = json!({"blob": "z".repeat(64 * 1024)});
    let (status, body) = send(app, delivery(zstd_json(&big), Some("zstd"))).await;

    assert_acknowledged(status, &body);
    let record = &sink.records()[0];
    assert_eq!(record.path, DecodePath::RawFallback);
    assert_eq!(
        record.recovered[0],
        DecodeError::DecompressedTooLarge { limit: 1024 }
    );
}

#[tokio::test]
async fn large_body_is_processed_without_a_cap() {
    let (app, sink) = test_app();
    let size = 11 * 1024 * 1024;
    let (status, body) = send(app, delivery(vec![b'x'; size], None)).await;

    assert_acknowledged(status, &body);
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].body_len, size);
    assert_eq!(records[0].kind, EventKind::Raw);
}

#[tokio::test]
async fn body_over_configured_cap_is_still_acknowledged() {
    let config = ServerConfig {
        max_body_size_mb: Some(1),
        ..Default::default()
    };
    let (app, sink) = test_app_with(config);
    let (status, body) = send(app, delivery(vec![b'{'; 2 * 1024 * 1024], Some("zstd"))).await;

    assert_acknowledged(status, &body);
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event, json!({}));
    assert_eq!(records[0].kind, EventKind::Empty);
    assert_eq!(
        records[0].recovered,
        vec![DecodeError::BodyTooLarge { limit: 1024 * 1024 }]
    );
}

#[tokio::test]
async fn body_at_configured_cap_is_decoded() {
    let config = ServerConfig {
        max_body_size_mb: Some(1),
        ..Default::default()
    };
    let (app, sink) = test_app_with(config);
    let (status, body) = send(app, delivery(r#"{"a":1}"#, None)).await;

    assert_acknowledged(status, &body);
    assert_eq!(sink.records()[0].event, json!({"a": 1}));
}

#[tokio::test]
async fn request_id_is_propagated_to_sink_and_response() {
    let (app, sink) = test_app();
    let mut request = delivery("{}", None);
    request
        .headers_mut()
        .insert("x-request-id", HeaderValue::from_static("delivery-77"));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "delivery-77"
    );
    assert_eq!(sink.records()[0].request_id, "delivery-77");
}

#[tokio::test]
async fn request_id_is_generated_when_missing() {
    let (app, sink) = test_app();
    let response = app.oneshot(delivery("{}", None)).await.unwrap();

    let header = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(uuid_like(&header), "unexpected request id {header}");
    assert_eq!(sink.records()[0].request_id, header);
}

fn uuid_like(value: &str) -> bool {
    value.len() == 36 && value.chars().filter(|c| *c == '-').count() == 4
}

#[tokio::test]
async fn custom_webhook_path_is_served() {
    let config = ServerConfig {
        webhook_path: "/hooks/wearables".into(),
        ..Default::default()
    };
    let (app, sink) = test_app_with(config);
    let request = Request::builder()
        .method("POST")
        .uri("/hooks/wearables")
        .body(Body::from("[]"))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_acknowledged(status, &body);
    assert_eq!(sink.records()[0].event, json!([]));
}

#[tokio::test]
async fn concurrent_deliveries_are_each_recorded_once() {
    let sink = Arc::new(MemorySink::new());
    let state = Arc::new(
        ServerState::with_sink(ServerConfig::default(), sink.clone()).expect("state"),
    );

    let handles: Vec<_> = (0..24)
        .map(|i| {
            let app = build_router(state.clone());
            tokio::spawn(async move {
                let doc = json!({"n": i});
                let request = if i % 2 == 0 {
                    delivery(serde_json::to_vec(&doc).unwrap(), None)
                } else {
                    delivery(zstd_json(&doc), Some("zstd"))
                };
                send(app, request).await
            })
        })
        .collect();

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_acknowledged(status, &body);
    }

    let mut seen: Vec<i64> = sink
        .records()
        .iter()
        .map(|r| r.event["n"].as_i64().unwrap())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..24).collect::<Vec<_>>());
}

#[tokio::test]
async fn get_on_webhook_route_is_not_allowed() {
    let (app, sink) = test_app();
    let request = Request::builder()
        .method("GET")
        .uri(WEBHOOK)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn unknown_route_returns_error_envelope() {
    let (app, _) = test_app();
    let request = Request::builder()
        .uri("/does-not-exist")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let envelope: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(envelope.error.code, "NOT_FOUND");
    assert_eq!(envelope.error.message, "Not found");
}

#[tokio::test]
async fn health_and_readiness_report_ok() {
    let (app, _) = test_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (app, _) = test_app();
    let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["pipeline"], "ready");
    assert_eq!(body["components"]["metrics"], "disabled");
}

#[tokio::test]
async fn metrics_without_recorder_returns_uptime_stub() {
    let (app, _) = test_app();
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn api_info_lists_webhook_route() {
    let (app, _) = test_app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Thryve Webhook");
    assert!(body["endpoints"]
        .as_array()
        .unwrap()
        .contains(&json!("POST /webhooks/thryve")));
}
