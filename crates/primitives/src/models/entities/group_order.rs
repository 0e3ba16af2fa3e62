use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;
use uuid::Uuid;

/// A single checkout covering multiple attendee registrations under one
/// buyer. Registrations link back via `group_order_id`.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::group_orders)]
pub struct GroupOrder {
    pub id: Uuid,
    pub order_code: String,
    pub event_id: Uuid,
    pub buyer_name: String,
    pub buyer_email: String,
    pub paid: bool,
    pub payment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::group_orders)]
pub struct NewGroupOrder<'a> {
    pub order_code: &'a str,
    pub event_id: Uuid,
    pub buyer_name: &'a str,
    pub buyer_email: &'a str,
}
