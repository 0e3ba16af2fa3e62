use attendly_primitives::error::ApiError;
use attendly_primitives::models::entities::addon::{Addon, NewRegistrationAddon, RegistrationAddon};
use attendly_primitives::schema::{addons, registration_addons};
use diesel::prelude::*;
use uuid::Uuid;

pub struct AddonRepository;

impl AddonRepository {
    pub fn find_active(
        conn: &mut PgConnection,
        event_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Addon>, ApiError> {
        addons::table
            .filter(addons::event_id.eq(event_id))
            .filter(addons::id.eq_any(ids))
            .filter(addons::active.eq(true))
            .load::<Addon>(conn)
            .map_err(ApiError::Database)
    }

    /// Attach an addon line to a registration. The (registration, addon,
    /// variant) uniqueness turns replays into no-ops; returns whether this
    /// call inserted the row.
    pub fn attach(
        conn: &mut PgConnection,
        new_addon: NewRegistrationAddon,
    ) -> Result<bool, ApiError> {
        let inserted = diesel::insert_into(registration_addons::table)
            .values(&new_addon)
            .on_conflict((
                registration_addons::registration_id,
                registration_addons::addon_id,
                registration_addons::variant,
            ))
            .do_nothing()
            .execute(conn)
            .map_err(ApiError::Database)?;

        Ok(inserted > 0)
    }

    pub fn find_by_registration(
        conn: &mut PgConnection,
        registration_id: Uuid,
    ) -> Result<Vec<RegistrationAddon>, ApiError> {
        registration_addons::table
            .filter(registration_addons::registration_id.eq(registration_id))
            .order(registration_addons::created_at.asc())
            .load::<RegistrationAddon>(conn)
            .map_err(ApiError::Database)
    }
}
