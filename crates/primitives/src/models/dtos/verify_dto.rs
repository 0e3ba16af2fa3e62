use crate::models::entities::enum_types::PaymentStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Client-initiated verification call, posted after the gateway checkout
/// redirects back with the signed (order, payment, signature) triple.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub registration_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub payment_id: Uuid,
    pub registration_id: Option<Uuid>,
    pub registration_number: Option<String>,
    pub status: PaymentStatus,
    pub is_duplicate: bool,
}
