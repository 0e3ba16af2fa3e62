use crate::models::entities::enum_types::{CurrencyCode, PaymentKind, PaymentStatus};
use chrono::{DateTime, Utc};
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// One checkout attempt. The metadata blob holds the original order intent
/// (tickets, addons, discount, group linkage) plus the verification audit
/// trail, and is only ever merged into, never overwritten.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(belongs_to(crate::models::entities::event::Event))]
pub struct Payment {
    pub id: Uuid,
    pub payment_number: String,
    /// None for orphan payments recorded from webhooks we cannot attribute.
    pub event_id: Option<Uuid>,

    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,

    pub amount: i64,
    pub currency: CurrencyCode,

    pub payer_name: String,
    pub payer_email: String,
    pub payer_phone: Option<String>,

    pub status: PaymentStatus,
    pub kind: PaymentKind,
    pub is_orphan: bool,

    pub metadata: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::payments)]
pub struct NewPayment<'a> {
    pub payment_number: &'a str,
    pub event_id: Option<Uuid>,
    pub gateway_order_id: &'a str,
    pub gateway_payment_id: Option<&'a str>,
    pub amount: i64,
    pub currency: CurrencyCode,
    pub payer_name: &'a str,
    pub payer_email: &'a str,
    pub payer_phone: Option<&'a str>,
    pub status: PaymentStatus,
    pub kind: PaymentKind,
    pub is_orphan: bool,
    pub metadata: Value,
}
