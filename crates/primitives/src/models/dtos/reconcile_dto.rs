use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct ReconcileRequest {
    /// When true, orphaned payments get a pending registration flagged for
    /// admin review. Dry runs never write.
    #[serde(default)]
    pub fix: bool,
    #[validate(range(min = 1, max = 720))]
    pub hours: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReconcileResponse {
    pub orphaned: usize,
    pub duplicates: usize,
    pub stale: usize,
    pub fixed: usize,
    pub details: Vec<ReconcileFinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReconcileFinding {
    pub finding: String,
    pub payment_id: Uuid,
    pub payment_number: String,
    pub related_payment_id: Option<Uuid>,
    pub amount: i64,
    pub payer_email: String,
    pub created_at: DateTime<Utc>,
    pub note: Option<String>,
}
