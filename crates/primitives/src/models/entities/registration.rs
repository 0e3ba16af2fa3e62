use crate::models::entities::enum_types::RegistrationStatus;
use chrono::{DateTime, Utc};
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = crate::schema::registrations)]
#[diesel(belongs_to(crate::models::entities::event::Event))]
pub struct Registration {
    pub id: Uuid,
    pub registration_number: String,
    pub event_id: Uuid,
    pub ticket_type_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub group_order_id: Option<Uuid>,

    pub attendee_name: String,
    pub attendee_email: String,
    pub attendee_phone: Option<String>,

    pub quantity: i32,
    pub amount: i64,

    pub status: RegistrationStatus,
    pub needs_review: bool,
    pub custom_fields: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::registrations)]
pub struct NewRegistration<'a> {
    pub registration_number: &'a str,
    pub event_id: Uuid,
    pub ticket_type_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub group_order_id: Option<Uuid>,
    pub attendee_name: &'a str,
    pub attendee_email: &'a str,
    pub attendee_phone: Option<&'a str>,
    pub quantity: i32,
    pub amount: i64,
    pub status: RegistrationStatus,
    pub needs_review: bool,
    pub custom_fields: Value,
}
