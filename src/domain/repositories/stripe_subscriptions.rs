use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::stripe_subscriptions::{
    InsertCustomerPlaceholderEntity, StripeSubscriptionEntity, UpsertStripeSubscriptionEntity,
};

#[async_trait]
#[automock]
pub trait StripeSubscriptionRepository {
    /// The profile's row, including a checkout placeholder without a subscription.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<StripeSubscriptionEntity>>;

    async fn insert_customer_placeholder(
        &self,
        insert_customer_entity: InsertCustomerPlaceholderEntity,
    ) -> Result<()>;

    /// Insert-or-overwrite keyed on `user_id`.
    async fn upsert_subscription(
        &self,
        upsert_subscription_entity: UpsertStripeSubscriptionEntity,
    ) -> Result<()>;
}
