use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::discount_code::DiscountCode;
use attendly_primitives::schema::discount_codes;
use diesel::prelude::*;
use uuid::Uuid;

pub struct DiscountRepository;

impl DiscountRepository {
    pub fn find_active(
        conn: &mut PgConnection,
        event_id: Uuid,
        code: &str,
    ) -> Result<Option<DiscountCode>, ApiError> {
        discount_codes::table
            .filter(discount_codes::event_id.eq(event_id))
            .filter(discount_codes::code.eq(code))
            .filter(discount_codes::active.eq(true))
            .first::<DiscountCode>(conn)
            .optional()
            .map_err(ApiError::Database)
    }
}
