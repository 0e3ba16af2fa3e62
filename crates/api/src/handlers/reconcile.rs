use attendly_core::services::ReconciliationService;
use attendly_core::AppState;
use attendly_primitives::error::{ApiError, ApiErrorResponse};
use attendly_primitives::models::dtos::reconcile_dto::{ReconcileRequest, ReconcileResponse};
use axum::extract::{Json, State};
use std::sync::Arc;
use tracing::error;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/admin/reconcile",
    tag = "Admin",
    summary = "Sweep recent payments for inconsistencies",
    description = "Scans the requested window for completed payments without registrations, \
                   probable duplicate charges, and stale pending payments. With `fix` set, \
                   orphaned payments get a pending registration flagged for review; payment \
                   status is never modified. Requires the `x-admin-key` header.",
    request_body = ReconcileRequest,
    responses(
        (status = 200, description = "Sweep findings", body = ReconcileResponse),
        (status = 400, description = "Invalid window", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid admin key", body = ApiErrorResponse),
    ),
    security(("adminKey" = [])),
)]
pub async fn reconcile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    req.validate().map_err(|e| {
        error!("Validation error: {}", e);
        ApiError::Validation(e)
    })?;

    let response = ReconciliationService::run(&state, &req)?;

    Ok(Json(response))
}
