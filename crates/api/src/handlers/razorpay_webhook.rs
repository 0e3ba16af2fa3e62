use attendly_core::services::ConfirmationService;
use attendly_core::AppState;
use attendly_primitives::error::{ApiError, ApiErrorResponse};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use http::HeaderMap;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[utoipa::path(
    post,
    path = "/api/webhooks/razorpay",
    tag = "Webhooks",
    summary = "Receive Razorpay webhook events",
    description = "Public endpoint for gateway event delivery (`payment.captured`, \
                   `payment.failed`, `refund.processed`, `refund.failed`). The signature in \
                   `x-razorpay-signature` is verified over the raw request body before any \
                   processing. Deliveries are at-least-once; handling is idempotent.",
    operation_id = "receiveRazorpayWebhook",
    request_body(
        content = String,
        description = "Raw JSON payload of the gateway event; the signature covers these exact bytes.",
    ),
    responses(
        (status = 200, description = "Webhook received and processed or deliberately ignored", body = Value),
        (status = 400, description = "Invalid signature or malformed payload", body = ApiErrorResponse),
    ),
    security(()),
)]
pub async fn razorpay_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get("x-razorpay-signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Signature("Missing x-razorpay-signature header".into()))?;

    info!(bytes = body.len(), "Razorpay webhook received");

    ConfirmationService::handle_webhook(&state, &body, signature).await?;

    // A 2xx with this body tells the gateway the delivery landed; non-2xx
    // responses trigger its retry policy.
    Ok(Json(json!({ "received": true })))
}
