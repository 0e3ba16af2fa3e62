use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::enum_types::RegistrationStatus;
use attendly_primitives::models::entities::registration::{NewRegistration, Registration};
use attendly_primitives::schema::registrations;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub struct RegistrationRepository;

impl RegistrationRepository {
    pub fn create(
        conn: &mut PgConnection,
        new_registration: NewRegistration,
    ) -> Result<Registration, ApiError> {
        diesel::insert_into(registrations::table)
            .values(&new_registration)
            .get_result::<Registration>(conn)
            .map_err(ApiError::Database)
    }

    pub fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Registration>, ApiError> {
        registrations::table
            .find(id)
            .first::<Registration>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn find_by_payment(
        conn: &mut PgConnection,
        payment_id: Uuid,
    ) -> Result<Vec<Registration>, ApiError> {
        registrations::table
            .filter(registrations::payment_id.eq(payment_id))
            .order(registrations::created_at.asc())
            .load::<Registration>(conn)
            .map_err(ApiError::Database)
    }

    pub fn exists_for_payment(conn: &mut PgConnection, payment_id: Uuid) -> Result<bool, ApiError> {
        use diesel::dsl::count_star;

        registrations::table
            .filter(registrations::payment_id.eq(payment_id))
            .select(count_star())
            .first::<i64>(conn)
            .map(|n| n > 0)
            .map_err(ApiError::Database)
    }

    pub fn find_by_group_order(
        conn: &mut PgConnection,
        group_order_id: Uuid,
    ) -> Result<Vec<Registration>, ApiError> {
        registrations::table
            .filter(registrations::group_order_id.eq(group_order_id))
            .order(registrations::created_at.asc())
            .load::<Registration>(conn)
            .map_err(ApiError::Database)
    }

    /// pending -> confirmed, also stamping the payment link. Guarded on the
    /// current status so a replayed confirmation is a no-op; returns whether
    /// this call performed the transition.
    pub fn confirm_if_pending(
        conn: &mut PgConnection,
        id: Uuid,
        payment_id: Uuid,
    ) -> Result<bool, ApiError> {
        let updated = diesel::update(
            registrations::table
                .find(id)
                .filter(registrations::status.eq(RegistrationStatus::Pending)),
        )
        .set((
            registrations::status.eq(RegistrationStatus::Confirmed),
            registrations::payment_id.eq(payment_id),
            registrations::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .map_err(ApiError::Database)?;

        Ok(updated > 0)
    }

    /// Cascade a refund to every confirmed registration under the payment.
    pub fn mark_refunded_by_payment(
        conn: &mut PgConnection,
        payment_id: Uuid,
    ) -> Result<usize, ApiError> {
        diesel::update(
            registrations::table
                .filter(registrations::payment_id.eq(payment_id))
                .filter(registrations::status.eq(RegistrationStatus::Confirmed)),
        )
        .set((
            registrations::status.eq(RegistrationStatus::Refunded),
            registrations::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .map_err(ApiError::Database)
    }
}
