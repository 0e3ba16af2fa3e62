use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;
use uuid::Uuid;

/// Event-scoped discount. Either a flat `amount_off` in minor units, a
/// percentage in basis points, or both.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::discount_codes)]
pub struct DiscountCode {
    pub id: Uuid,
    pub event_id: Uuid,
    pub code: String,
    pub amount_off: i64,
    pub percent_bps: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::discount_codes)]
pub struct NewDiscountCode<'a> {
    pub event_id: Uuid,
    pub code: &'a str,
    pub amount_off: i64,
    pub percent_bps: i32,
}
