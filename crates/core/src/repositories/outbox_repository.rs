use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::enum_types::OutboxStatus;
use attendly_primitives::models::entities::outbox::{NewOutboxEntry, OutboxEntry};
use attendly_primitives::schema::notification_outbox;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub struct OutboxRepository;

impl OutboxRepository {
    pub fn enqueue(conn: &mut PgConnection, entry: NewOutboxEntry) -> Result<(), ApiError> {
        diesel::insert_into(notification_outbox::table)
            .values(&entry)
            .execute(conn)
            .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Grab a batch of pending entries, oldest first. The row locks only
    /// last until the fetch transaction commits; exactly-once delivery
    /// relies on there being a single drain task per deployment.
    pub fn fetch_batch(
        conn: &mut PgConnection,
        limit: i64,
    ) -> Result<Vec<OutboxEntry>, ApiError> {
        notification_outbox::table
            .filter(notification_outbox::status.eq(OutboxStatus::Pending))
            .order(notification_outbox::created_at.asc())
            .limit(limit)
            .for_update()
            .skip_locked()
            .load::<OutboxEntry>(conn)
            .map_err(ApiError::Database)
    }

    pub fn mark_sent(conn: &mut PgConnection, id: Uuid) -> Result<(), ApiError> {
        diesel::update(notification_outbox::table.find(id))
            .set((
                notification_outbox::status.eq(OutboxStatus::Sent),
                notification_outbox::processed_at.eq(Utc::now()),
            ))
            .execute(conn)
            .map_err(ApiError::Database)?;

        Ok(())
    }

    pub fn mark_failed(conn: &mut PgConnection, id: Uuid) -> Result<(), ApiError> {
        diesel::update(notification_outbox::table.find(id))
            .set((
                notification_outbox::status.eq(OutboxStatus::Failed),
                notification_outbox::attempts.eq(notification_outbox::attempts + 1),
                notification_outbox::processed_at.eq(Utc::now()),
            ))
            .execute(conn)
            .map_err(ApiError::Database)?;

        Ok(())
    }
}
