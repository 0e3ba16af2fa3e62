use attendly_core::services::ConfirmationService;
use attendly_core::AppState;
use attendly_primitives::error::{ApiError, ApiErrorResponse};
use attendly_primitives::models::dtos::verify_dto::{VerifyPaymentRequest, VerifyPaymentResponse};
use axum::extract::{Json, State};
use std::sync::Arc;
use tracing::info;

#[utoipa::path(
    post,
    path = "/api/payments/verify",
    tag = "Payments",
    summary = "Verify a completed checkout",
    description = "Called by the client after the gateway checkout succeeds. Verifies the \
                   gateway signature over the (order, payment) pair, transitions the payment \
                   to completed and materializes the registrations. Safe to call repeatedly; \
                   replays return `is_duplicate`.",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified and registrations confirmed", body = VerifyPaymentResponse),
        (status = 400, description = "Invalid signature or payment not confirmable", body = ApiErrorResponse),
        (status = 404, description = "No order found for this payment", body = ApiErrorResponse),
    ),
    security(()),
)]
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    info!(order_id = %req.razorpay_order_id, "Verify payment requested");

    let response = ConfirmationService::verify(&state, req).await?;

    Ok(Json(response))
}
