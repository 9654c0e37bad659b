use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, upsert::excluded};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::stripe_subscriptions::{
            InsertCustomerPlaceholderEntity, StripeSubscriptionEntity,
            UpsertStripeSubscriptionEntity,
        },
        repositories::stripe_subscriptions::StripeSubscriptionRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::stripe_subscriptions},
};

pub struct StripeSubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl StripeSubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl StripeSubscriptionRepository for StripeSubscriptionPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<StripeSubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = stripe_subscriptions::table
            .filter(stripe_subscriptions::user_id.eq(user_id))
            .select(StripeSubscriptionEntity::as_select())
            .first::<StripeSubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn insert_customer_placeholder(
        &self,
        insert_customer_entity: InsertCustomerPlaceholderEntity,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // A concurrent checkout may have stored a customer first; keep the newest id.
        insert_into(stripe_subscriptions::table)
            .values(&insert_customer_entity)
            .on_conflict(stripe_subscriptions::user_id)
            .do_update()
            .set((
                stripe_subscriptions::stripe_customer_id
                    .eq(excluded(stripe_subscriptions::stripe_customer_id)),
                stripe_subscriptions::updated_at.eq(excluded(stripe_subscriptions::updated_at)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn upsert_subscription(
        &self,
        upsert_subscription_entity: UpsertStripeSubscriptionEntity,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(stripe_subscriptions::table)
            .values(&upsert_subscription_entity)
            .on_conflict(stripe_subscriptions::user_id)
            .do_update()
            .set(&upsert_subscription_entity)
            .execute(&mut conn)?;

        Ok(())
    }
}
