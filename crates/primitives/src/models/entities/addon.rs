use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::addons)]
pub struct Addon {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub price: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Join of a registration to a purchased addon/variant with the price
/// captured at purchase time. Unique per (registration, addon, variant).
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::registration_addons)]
pub struct RegistrationAddon {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub addon_id: Uuid,
    pub variant: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::registration_addons)]
pub struct NewRegistrationAddon<'a> {
    pub registration_id: Uuid,
    pub addon_id: Uuid,
    pub variant: &'a str,
    pub quantity: i32,
    pub unit_price: i64,
}
