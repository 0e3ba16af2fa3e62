use crate::app_state::AppState;
use crate::repositories::OutboxRepository;
use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::outbox::OutboxEntry;
use diesel::Connection;
use tracing::{info, warn};

pub struct NotificationService;

impl NotificationService {
    /// Drain one batch of pending outbox entries. Delivery happens outside
    /// the fetch transaction; each entry is marked sent or failed on its
    /// own, so one bad address never stalls the batch.
    pub async fn drain_once(state: &AppState, batch_size: i64) -> Result<usize, ApiError> {
        let mut conn = state
            .db
            .get()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        let batch: Vec<OutboxEntry> = conn
            .transaction(|conn| OutboxRepository::fetch_batch(conn, batch_size))?;

        if batch.is_empty() {
            return Ok(0);
        }

        let mut sent = 0usize;
        for entry in batch {
            let delivered = Self::deliver(state, &entry).await;

            let result = match delivered {
                Ok(()) => {
                    sent += 1;
                    OutboxRepository::mark_sent(&mut conn, entry.id)
                }
                Err(e) => {
                    warn!(outbox_id = %entry.id, "Notification delivery failed: {}", e);
                    OutboxRepository::mark_failed(&mut conn, entry.id)
                }
            };

            if let Err(e) = result {
                warn!(outbox_id = %entry.id, "Could not update outbox entry: {}", e);
            }
        }

        info!(sent, "Drained notification outbox batch");
        Ok(sent)
    }

    async fn deliver(state: &AppState, entry: &OutboxEntry) -> Result<(), ApiError> {
        let email = entry
            .payload
            .get("attendee_email")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if email.is_empty() {
            return Err(ApiError::Internal("Outbox entry has no recipient".into()));
        }

        let number = entry
            .payload
            .get("registration_number")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let phone = entry
            .payload
            .get("attendee_phone")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        match entry.kind.as_str() {
            "registration_confirmed" => {
                state
                    .email
                    .send_email(
                        email,
                        &format!("Registration confirmed: {}", number),
                        "Your registration is confirmed.",
                    )
                    .await?;
                // WhatsApp needs a phone number; attendees without one still
                // get the email.
                if !phone.is_empty() {
                    state.whatsapp.send_message(phone, &entry.payload).await?;
                }
                Ok(())
            }
            other => Err(ApiError::Internal(format!(
                "Unknown notification kind: {}",
                other
            ))),
        }
    }
}
