use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::profiles::{InsertProfileEntity, ProfileEntity},
        repositories::profiles::ProfileRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::profiles},
};

pub struct ProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProfileRepository for ProfilePostgres {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<ProfileEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = profiles::table
            .filter(profiles::id.eq(user_id))
            .select(ProfileEntity::as_select())
            .first::<ProfileEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_id_by_email(&self, email: String) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = profiles::table
            .filter(profiles::email.eq(email))
            .select(profiles::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create_if_absent(&self, insert_profile_entity: InsertProfileEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Only an existing id is tolerated; an email held by another profile surfaces as an error.
        insert_into(profiles::table)
            .values(&insert_profile_entity)
            .on_conflict(profiles::id)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(())
    }

    async fn update_premium_status(&self, user_id: Uuid, is_premium: bool) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(profiles::table)
            .filter(profiles::id.eq(user_id))
            .set((
                profiles::is_premium.eq(is_premium),
                profiles::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
