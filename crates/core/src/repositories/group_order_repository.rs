use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::group_order::{GroupOrder, NewGroupOrder};
use attendly_primitives::schema::group_orders;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub struct GroupOrderRepository;

impl GroupOrderRepository {
    pub fn create(
        conn: &mut PgConnection,
        new_group_order: NewGroupOrder,
    ) -> Result<GroupOrder, ApiError> {
        diesel::insert_into(group_orders::table)
            .values(&new_group_order)
            .get_result::<GroupOrder>(conn)
            .map_err(ApiError::Database)
    }

    pub fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<GroupOrder>, ApiError> {
        group_orders::table
            .find(id)
            .first::<GroupOrder>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn mark_paid(
        conn: &mut PgConnection,
        id: Uuid,
        payment_id: Uuid,
    ) -> Result<(), ApiError> {
        diesel::update(group_orders::table.find(id))
            .set((
                group_orders::paid.eq(true),
                group_orders::payment_id.eq(payment_id),
                group_orders::updated_at.eq(Utc::now()),
            ))
            .execute(conn)
            .map_err(ApiError::Database)?;

        Ok(())
    }
}
