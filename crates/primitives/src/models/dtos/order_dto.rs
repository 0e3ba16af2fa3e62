use crate::models::entities::enum_types::CurrencyCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Checkout order creation. The client never supplies an amount; the server
/// computes the charge from ticket/addon/discount lookups.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    pub event_id: Uuid,

    /// Absent for addon-only purchases against an existing registration.
    pub ticket_type_id: Option<Uuid>,
    #[validate(range(min = 1, max = 50))]
    pub quantity: i32,

    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,

    #[serde(default)]
    pub addons: Vec<AddonSelection>,
    pub discount_code: Option<String>,

    /// Registration created by the client before payment, to be confirmed on
    /// capture; required for addon-only purchases.
    pub registration_id: Option<Uuid>,

    /// Group checkout: one pending registration per attendee, linked under a
    /// single group order before redirect to the gateway.
    #[serde(default)]
    pub attendees: Vec<AttendeeInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddonSelection {
    pub addon_id: Uuid,
    pub variant: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendeeInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// What the buyer paid for, snapshotted into the payment's metadata under
/// the `intent` key at order time. Confirmation replays this, never the
/// request, so a retried confirmation always sees the original purchase.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderIntent {
    pub ticket_type_id: Option<Uuid>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub addons: Vec<AddonIntent>,
    pub discount_code: Option<String>,
    pub registration_id: Option<Uuid>,
    pub group_order_id: Option<Uuid>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonIntent {
    pub addon_id: Uuid,
    #[serde(default)]
    pub variant: String,
    pub quantity: i32,
    pub unit_price: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub payment_id: Uuid,
    pub payment_number: String,
    pub amount: i64,
    pub currency: CurrencyCode,
    pub key_id: String,
    pub is_duplicate: bool,
}
