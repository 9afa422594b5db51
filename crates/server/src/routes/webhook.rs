use crate::middleware::REQUEST_ID_HEADER;
use crate::sink::DeliveryDiagnostic;
use crate::state::ServerState;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_ENCODING;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{BoxError, Json};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thryve::{ProcessedDelivery, RawDelivery};

/// Fixed acknowledgment returned for every delivery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledgment {
    pub status: String,
}

impl Acknowledgment {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Result of reading the request body
enum Intake {
    Complete(Bytes),
    TooLarge { limit: usize },
    Interrupted(BoxError),
}

async fn read_body(body: Body, limit: Option<usize>) -> Intake {
    let collected = match limit {
        Some(limit) => Limited::new(body, limit).collect().await,
        None => body.collect().await.map_err(BoxError::from),
    };

    match collected {
        Ok(collected) => Intake::Complete(collected.to_bytes()),
        Err(err) => match limit {
            Some(limit) if err.downcast_ref::<LengthLimitError>().is_some() => {
                Intake::TooLarge { limit }
            }
            _ => Intake::Interrupted(err),
        },
    }
}

/// Receive a webhook delivery.
///
/// Reads the whole body and the optional `content-encoding` header, runs the
/// decode pipeline on the blocking pool, hands the result to the diagnostic
/// sink and acknowledges.
///
/// The response is always `200 {"status": "ok"}`: decode and parse outcomes
/// are only visible through the sink and metrics. A header value that is not
/// visible ASCII is treated as absent. A body over `max_body_size_mb` is not
/// decoded; it is recorded as an empty event carrying
/// [`thryve::DecodeError::BodyTooLarge`].
pub async fn receive_webhook(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Body,
) -> impl IntoResponse {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let processed = match read_body(body, state.config.max_body_size()).await {
        Intake::Complete(body) => {
            let content_encoding = headers
                .get(CONTENT_ENCODING)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            run_pipeline(&state, &request_id, body, content_encoding).await
        }
        Intake::TooLarge { limit } => {
            tracing::warn!(request_id = %request_id, limit, "webhook_body_too_large");
            metrics::counter!("webhook_oversized_total").increment(1);
            Some(ProcessedDelivery::oversized(limit))
        }
        Intake::Interrupted(err) => {
            tracing::warn!(request_id = %request_id, error = %err, "webhook_body_interrupted");
            None
        }
    };

    if let Some(delivery) = processed {
        metrics::histogram!("webhook_body_bytes").record(delivery.body_len as f64);
        state.sink.record(&DeliveryDiagnostic {
            request_id: &request_id,
            delivery: &delivery,
        });
    }

    (StatusCode::OK, Json(Acknowledgment::ok()))
}

async fn run_pipeline(
    state: &ServerState,
    request_id: &str,
    body: Bytes,
    content_encoding: Option<String>,
) -> Option<ProcessedDelivery> {
    let raw = RawDelivery {
        body,
        content_encoding,
    };
    let decode_cfg = state.config.decode.clone();

    match tokio::task::spawn_blocking(move || thryve::process_delivery(raw, &decode_cfg)).await {
        Ok(delivery) => Some(delivery),
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                error = %err,
                "webhook_pipeline_aborted"
            );
            None
        }
    }
}
