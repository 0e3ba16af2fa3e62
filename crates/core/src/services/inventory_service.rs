use crate::repositories::TicketTypeRepository;
use attendly_primitives::error::ApiError;
use diesel::prelude::*;
use diesel::Connection;
use tracing::warn;
use uuid::Uuid;

/// What a single accounting attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryOutcome {
    /// Counter moved, claim recorded.
    Incremented,
    /// Counter moved through the metadata fallback; claim table unavailable.
    IncrementedDegraded,
    /// Another attempt already accounted this (ticket type, payment) pair.
    AlreadyProcessed,
    /// Nothing to account (no ticket type on the purchase).
    Skipped,
}

pub struct InventoryService;

impl InventoryService {
    /// Account sold inventory for a confirmed payment, exactly once per
    /// (ticket type, payment) pair no matter how many verify calls and
    /// webhook deliveries race.
    ///
    /// Primary path: claim-row insert and counter increment in one
    /// transaction, with the claim's primary key as the dedup gate. If the
    /// claim table is missing (partial deployment), fall back to a bounded
    /// processed-payments list in the ticket type's metadata in a fresh
    /// transaction; the first attempt aborted, so the fallback cannot share
    /// it.
    pub fn record_sale(
        conn: &mut PgConnection,
        ticket_type_id: Option<Uuid>,
        payment_id: Uuid,
        quantity: i32,
    ) -> Result<InventoryOutcome, ApiError> {
        let Some(ticket_type_id) = ticket_type_id else {
            return Ok(InventoryOutcome::Skipped);
        };

        let claimed = conn.transaction::<_, ApiError, _>(|conn| {
            let claimed =
                TicketTypeRepository::insert_claim(conn, ticket_type_id, payment_id, quantity)?;
            if claimed {
                TicketTypeRepository::increment_sold(conn, ticket_type_id, quantity)?;
            }
            Ok(claimed)
        });

        match claimed {
            Ok(true) => Ok(InventoryOutcome::Incremented),
            Ok(false) => Ok(InventoryOutcome::AlreadyProcessed),
            Err(e) if Self::is_missing_claim_table(&e) => {
                warn!(
                    %ticket_type_id,
                    "Inventory claim table unavailable, using metadata fallback"
                );
                Self::record_sale_degraded(conn, ticket_type_id, payment_id, quantity)
            }
            Err(e) => Err(e),
        }
    }

    fn record_sale_degraded(
        conn: &mut PgConnection,
        ticket_type_id: Uuid,
        payment_id: Uuid,
        quantity: i32,
    ) -> Result<InventoryOutcome, ApiError> {
        let recorded = conn.transaction::<_, ApiError, _>(|conn| {
            let recorded =
                TicketTypeRepository::fallback_mark_processed(conn, ticket_type_id, payment_id)?;
            if recorded {
                TicketTypeRepository::increment_sold(conn, ticket_type_id, quantity)?;
            }
            Ok(recorded)
        })?;

        if recorded {
            Ok(InventoryOutcome::IncrementedDegraded)
        } else {
            Ok(InventoryOutcome::AlreadyProcessed)
        }
    }

    fn is_missing_claim_table(error: &ApiError) -> bool {
        match error {
            ApiError::Database(diesel::result::Error::DatabaseError(_, info)) => {
                info.message().contains("ticket_inventory_claims")
                    && info.message().contains("does not exist")
            }
            _ => false,
        }
    }
}
