use crate::models::entities::enum_types::OutboxStatus;
use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Durable "send notification for registration X" record, enqueued alongside
/// confirmation and drained by a background consumer.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::notification_outbox)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub kind: String,
    pub payload: Value,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notification_outbox)]
pub struct NewOutboxEntry<'a> {
    pub registration_id: Uuid,
    pub kind: &'a str,
    pub payload: Value,
}
