use crate::models::entities::enum_types::CurrencyCode;
use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;
use uuid::Uuid;

/// One tenant event. Carries optional gateway sub-account credentials and the
/// registration numbering configuration.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::events)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub currency: CurrencyCode,

    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub razorpay_webhook_secret: Option<String>,

    pub custom_numbering: bool,
    pub reg_prefix: String,
    pub reg_suffix: String,
    pub reg_start: i64,
    pub reg_counter: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::events)]
pub struct NewEvent<'a> {
    pub name: &'a str,
    pub currency: CurrencyCode,
    pub custom_numbering: bool,
    pub reg_prefix: &'a str,
    pub reg_suffix: &'a str,
    pub reg_start: i64,
}
