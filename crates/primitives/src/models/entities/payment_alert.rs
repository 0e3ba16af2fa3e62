use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Best-effort diagnostic record for anomalies (orphan webhook, orphan
/// payment). Advisory only; writing one never blocks the main flow.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::payment_alerts)]
pub struct PaymentAlert {
    pub id: Uuid,
    pub alert_type: String,
    pub message: String,
    pub payment_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::payment_alerts)]
pub struct NewPaymentAlert<'a> {
    pub alert_type: &'a str,
    pub message: &'a str,
    pub payment_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub details: Value,
}
