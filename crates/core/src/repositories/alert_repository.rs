use attendly_primitives::models::entities::payment_alert::NewPaymentAlert;
use attendly_primitives::schema::payment_alerts;
use diesel::prelude::*;
use tracing::warn;

pub struct AlertRepository;

impl AlertRepository {
    /// Best-effort: alerts are diagnostics, a failed insert must never fail
    /// the payment flow that raised it.
    pub fn record(conn: &mut PgConnection, alert: NewPaymentAlert) {
        if let Err(e) = diesel::insert_into(payment_alerts::table)
            .values(&alert)
            .execute(conn)
        {
            warn!(alert_type = alert.alert_type, "Failed to record payment alert: {}", e);
        }
    }
}
