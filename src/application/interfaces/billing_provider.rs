use anyhow::Result as AnyResult;
use async_trait::async_trait;
use uuid::Uuid;

use crate::payments::{
    stripe_client::StripeClient,
    stripe_objects::{CheckoutSessionRequest, StripeCustomer, StripeSubscription},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn retrieve_subscription(&self, subscription_id: &str) -> AnyResult<StripeSubscription>;

    /// `None` when the provider has no customer with this id.
    async fn retrieve_customer(&self, customer_id: &str) -> AnyResult<Option<StripeCustomer>>;

    async fn create_customer(&self, email: &str, user_id: Uuid) -> AnyResult<String>;

    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> AnyResult<String>;
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn retrieve_subscription(&self, subscription_id: &str) -> AnyResult<StripeSubscription> {
        self.retrieve_subscription(subscription_id).await
    }

    async fn retrieve_customer(&self, customer_id: &str) -> AnyResult<Option<StripeCustomer>> {
        self.retrieve_customer(customer_id).await
    }

    async fn create_customer(&self, email: &str, user_id: Uuid) -> AnyResult<String> {
        self.create_customer(email, user_id).await
    }

    async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> AnyResult<String> {
        self.create_checkout_session(&request).await
    }
}
