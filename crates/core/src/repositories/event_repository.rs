use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::event::Event;
use attendly_primitives::schema::events;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use uuid::Uuid;

pub struct EventRepository;

impl EventRepository {
    pub fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Event>, ApiError> {
        events::table
            .find(id)
            .first::<Event>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    /// Atomically take the next number from the event's counter. GREATEST
    /// lets a freshly configured `reg_start` jump the counter forward without
    /// a separate backfill, and RETURNING means no read-then-write race.
    pub fn allocate_registration_number(
        conn: &mut PgConnection,
        event_id: Uuid,
    ) -> Result<i64, ApiError> {
        diesel::update(events::table.find(event_id))
            .set(events::reg_counter.eq(sql::<BigInt>("GREATEST(reg_start, reg_counter + 1)")))
            .returning(events::reg_counter)
            .get_result::<i64>(conn)
            .map_err(ApiError::Database)
    }
}
