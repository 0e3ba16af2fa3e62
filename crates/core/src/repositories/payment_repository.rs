use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::enum_types::PaymentStatus;
use attendly_primitives::models::entities::payment::{NewPayment, Payment};
use attendly_primitives::schema::{payments, registrations};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

pub struct PaymentRepository;

impl PaymentRepository {
    /// Insert a pending payment keyed on the gateway order id. A concurrent
    /// insert for the same order loses the conflict and gets the winner's row
    /// back instead.
    pub fn create(conn: &mut PgConnection, new_payment: NewPayment) -> Result<Payment, ApiError> {
        let inserted_id = diesel::insert_into(payments::table)
            .values(&new_payment)
            .on_conflict(payments::gateway_order_id)
            .do_nothing()
            .returning(payments::id)
            .get_result::<Uuid>(conn)
            .optional()
            .map_err(ApiError::Database)?;

        match inserted_id {
            Some(id) => payments::table
                .find(id)
                .first::<Payment>(conn)
                .map_err(ApiError::Database),
            None => payments::table
                .filter(payments::gateway_order_id.eq(new_payment.gateway_order_id))
                .first::<Payment>(conn)
                .map_err(ApiError::Database),
        }
    }

    pub fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Payment>, ApiError> {
        payments::table
            .find(id)
            .first::<Payment>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn find_by_gateway_order_id(
        conn: &mut PgConnection,
        order_id: &str,
    ) -> Result<Option<Payment>, ApiError> {
        payments::table
            .filter(payments::gateway_order_id.eq(order_id))
            .first::<Payment>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn find_by_gateway_payment_id(
        conn: &mut PgConnection,
        gateway_payment_id: &str,
    ) -> Result<Option<Payment>, ApiError> {
        payments::table
            .filter(payments::gateway_payment_id.eq(gateway_payment_id))
            .first::<Payment>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    /// Ledger transition pending -> completed. The status guard in the WHERE
    /// clause makes this a compare-and-set: exactly one caller sees `true`,
    /// every concurrent retry sees `false`.
    pub fn mark_completed(
        conn: &mut PgConnection,
        id: Uuid,
        gateway_payment_id: &str,
    ) -> Result<bool, ApiError> {
        let updated = diesel::update(
            payments::table
                .find(id)
                .filter(payments::status.eq(PaymentStatus::Pending)),
        )
        .set((
            payments::status.eq(PaymentStatus::Completed),
            payments::gateway_payment_id.eq(gateway_payment_id),
            payments::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .map_err(ApiError::Database)?;

        Ok(updated > 0)
    }

    /// pending -> failed, same guard shape as `mark_completed`.
    pub fn mark_failed(
        conn: &mut PgConnection,
        id: Uuid,
        gateway_payment_id: Option<&str>,
    ) -> Result<bool, ApiError> {
        let updated = diesel::update(
            payments::table
                .find(id)
                .filter(payments::status.eq(PaymentStatus::Pending)),
        )
        .set((
            payments::status.eq(PaymentStatus::Failed),
            payments::gateway_payment_id.eq(gateway_payment_id),
            payments::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .map_err(ApiError::Database)?;

        Ok(updated > 0)
    }

    /// completed -> refunded. Refund webhooks are delivered at least once,
    /// so the guard also dedupes replays.
    pub fn mark_refunded(conn: &mut PgConnection, id: Uuid) -> Result<bool, ApiError> {
        let updated = diesel::update(
            payments::table
                .find(id)
                .filter(payments::status.eq(PaymentStatus::Completed)),
        )
        .set((
            payments::status.eq(PaymentStatus::Refunded),
            payments::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .map_err(ApiError::Database)?;

        Ok(updated > 0)
    }

    /// Shallow-merge a patch into the metadata blob. Existing keys not named
    /// in the patch survive; callers wanting atomicity run this inside their
    /// own transaction with the payment row locked.
    pub fn merge_metadata(
        conn: &mut PgConnection,
        id: Uuid,
        patch: &Value,
    ) -> Result<(), ApiError> {
        let current = payments::table
            .find(id)
            .select(payments::metadata)
            .for_update()
            .first::<Value>(conn)
            .map_err(ApiError::Database)?;

        let mut merged = match current {
            Value::Object(map) => Value::Object(map),
            _ => Value::Object(Default::default()),
        };

        if let (Value::Object(target), Value::Object(source)) = (&mut merged, patch) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }

        diesel::update(payments::table.find(id))
            .set((
                payments::metadata.eq(merged),
                payments::updated_at.eq(Utc::now()),
            ))
            .execute(conn)
            .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Most recent still-pending payment matching the buyer fingerprint,
    /// used to suppress accidental double checkouts.
    pub fn find_recent_pending_duplicate(
        conn: &mut PgConnection,
        event_id: Uuid,
        payer_email: &str,
        amount: i64,
        since: DateTime<Utc>,
    ) -> Result<Option<Payment>, ApiError> {
        payments::table
            .filter(payments::event_id.eq(event_id))
            .filter(payments::payer_email.eq(payer_email))
            .filter(payments::amount.eq(amount))
            .filter(payments::status.eq(PaymentStatus::Pending))
            .filter(payments::created_at.gt(since))
            .order(payments::created_at.desc())
            .first::<Payment>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    /// Completed payments with no registration rows at all, scoped to the
    /// sweep window.
    pub fn find_completed_without_registrations(
        conn: &mut PgConnection,
        since: DateTime<Utc>,
    ) -> Result<Vec<Payment>, ApiError> {
        payments::table
            .left_join(registrations::table)
            .filter(payments::status.eq(PaymentStatus::Completed))
            .filter(payments::created_at.gt(since))
            .filter(registrations::id.nullable().is_null())
            .select(payments::all_columns)
            .load::<Payment>(conn)
            .map_err(ApiError::Database)
    }

    /// Pending and completed payments in the window, oldest first. Both
    /// states feed duplicate detection: the common double-charge shape is a
    /// completed payment next to a still-pending retry from the same buyer.
    pub fn find_duplicate_candidates(
        conn: &mut PgConnection,
        since: DateTime<Utc>,
    ) -> Result<Vec<Payment>, ApiError> {
        payments::table
            .filter(payments::status.eq_any([PaymentStatus::Pending, PaymentStatus::Completed]))
            .filter(payments::created_at.gt(since))
            .order(payments::created_at.asc())
            .load::<Payment>(conn)
            .map_err(ApiError::Database)
    }

    pub fn find_stale_pending(
        conn: &mut PgConnection,
        older_than: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> Result<Vec<Payment>, ApiError> {
        payments::table
            .filter(payments::status.eq(PaymentStatus::Pending))
            .filter(payments::created_at.lt(older_than))
            .filter(payments::created_at.gt(since))
            .order(payments::created_at.asc())
            .load::<Payment>(conn)
            .map_err(ApiError::Database)
    }
}
