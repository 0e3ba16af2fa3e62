use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::ticket_type::TicketType;
use attendly_primitives::schema::{ticket_inventory_claims, ticket_types};
use chrono::Utc;
use diesel::prelude::*;
use serde_json::{json, Value};
use uuid::Uuid;

/// Degraded-path processed list never grows past this.
pub const FALLBACK_PROCESSED_CAP: usize = 50;

pub struct TicketTypeRepository;

impl TicketTypeRepository {
    pub fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<TicketType>, ApiError> {
        ticket_types::table
            .find(id)
            .first::<TicketType>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    /// Claim this (ticket type, payment) pair. The primary key makes the
    /// insert the idempotency gate: the first caller gets `true`, any replay
    /// conflicts and gets `false`.
    pub fn insert_claim(
        conn: &mut PgConnection,
        ticket_type_id: Uuid,
        payment_id: Uuid,
        quantity: i32,
    ) -> Result<bool, ApiError> {
        let inserted = diesel::insert_into(ticket_inventory_claims::table)
            .values((
                ticket_inventory_claims::ticket_type_id.eq(ticket_type_id),
                ticket_inventory_claims::payment_id.eq(payment_id),
                ticket_inventory_claims::quantity.eq(quantity),
            ))
            .on_conflict((
                ticket_inventory_claims::ticket_type_id,
                ticket_inventory_claims::payment_id,
            ))
            .do_nothing()
            .execute(conn)
            .map_err(ApiError::Database)?;

        Ok(inserted > 0)
    }

    pub fn increment_sold(
        conn: &mut PgConnection,
        ticket_type_id: Uuid,
        quantity: i32,
    ) -> Result<(), ApiError> {
        diesel::update(ticket_types::table.find(ticket_type_id))
            .set((
                ticket_types::quantity_sold.eq(ticket_types::quantity_sold + quantity),
                ticket_types::updated_at.eq(Utc::now()),
            ))
            .execute(conn)
            .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Degraded dedup for deployments missing the claims table: a bounded
    /// processed-payments list inside the ticket type's metadata blob. Reads
    /// with the row locked, so concurrent callers serialize. Returns `false`
    /// when the payment was already recorded.
    pub fn fallback_mark_processed(
        conn: &mut PgConnection,
        ticket_type_id: Uuid,
        payment_id: Uuid,
    ) -> Result<bool, ApiError> {
        let metadata = ticket_types::table
            .find(ticket_type_id)
            .select(ticket_types::metadata)
            .for_update()
            .first::<Value>(conn)
            .map_err(ApiError::Database)?;

        let payment_key = payment_id.to_string();
        let mut processed: Vec<String> = metadata
            .get("processed_payments")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        if processed.contains(&payment_key) {
            return Ok(false);
        }

        processed.push(payment_key);
        if processed.len() > FALLBACK_PROCESSED_CAP {
            let excess = processed.len() - FALLBACK_PROCESSED_CAP;
            processed.drain(..excess);
        }

        let mut updated = match metadata {
            Value::Object(map) => Value::Object(map),
            _ => json!({}),
        };
        if let Value::Object(map) = &mut updated {
            map.insert("processed_payments".into(), json!(processed));
        }

        diesel::update(ticket_types::table.find(ticket_type_id))
            .set((
                ticket_types::metadata.eq(updated),
                ticket_types::updated_at.eq(Utc::now()),
            ))
            .execute(conn)
            .map_err(ApiError::Database)?;

        Ok(true)
    }
}
