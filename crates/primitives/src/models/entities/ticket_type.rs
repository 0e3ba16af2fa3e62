use chrono::{DateTime, Utc};
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Inventory unit. `quantity_total` of `None` means unlimited. The metadata
/// blob carries the bounded processed-payments list used only by the degraded
/// inventory fallback path.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = crate::schema::ticket_types)]
#[diesel(belongs_to(crate::models::entities::event::Event))]
pub struct TicketType {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub price: i64,
    pub tax_bps: i32,
    pub quantity_total: Option<i32>,
    pub quantity_sold: i32,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ticket_types)]
pub struct NewTicketType<'a> {
    pub event_id: Uuid,
    pub name: &'a str,
    pub price: i64,
    pub tax_bps: i32,
    pub quantity_total: Option<i32>,
}
