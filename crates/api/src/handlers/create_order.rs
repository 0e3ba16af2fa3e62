use attendly_core::services::OrderService;
use attendly_core::AppState;
use attendly_primitives::error::{ApiError, ApiErrorResponse};
use attendly_primitives::models::dtos::order_dto::{CreateOrderRequest, CreateOrderResponse};
use axum::extract::{Json, State};
use std::sync::Arc;
use tracing::error;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    summary = "Create a checkout order",
    description = "Computes the charge server-side from ticket, addon and discount lookups, \
                   creates the gateway order and a pending payment row, and returns what the \
                   client needs to open checkout. A repeat request from the same buyer for the \
                   same amount within the duplicate window returns the existing order with \
                   `is_duplicate` set.",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created or existing pending order reused", body = CreateOrderResponse),
        (status = 400, description = "Invalid input, sold out, or bad discount code", body = ApiErrorResponse),
        (status = 404, description = "Event, ticket type or registration not found", body = ApiErrorResponse),
        (status = 502, description = "Gateway order creation failed", body = ApiErrorResponse),
    ),
    security(()),
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    req.validate().map_err(|e| {
        error!("Validation error: {}", e);
        ApiError::Validation(e)
    })?;

    let response = OrderService::create_order(&state, req).await?;

    Ok(Json(response))
}
