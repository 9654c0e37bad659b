use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::{
        errors::{BillingError, UseCaseResult},
        interfaces::{billing_provider::BillingProvider, identity::IdentityVerifier},
    },
    domain::{
        entities::{
            profiles::InsertProfileEntity, stripe_subscriptions::InsertCustomerPlaceholderEntity,
        },
        repositories::{
            profiles::ProfileRepository, stripe_subscriptions::StripeSubscriptionRepository,
        },
        value_objects::iam::AuthUser,
    },
    payments::stripe_objects::CheckoutSessionRequest,
};

pub struct CheckoutUseCase<P, S, B, I>
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeSubscriptionRepository + Send + Sync + 'static,
    B: BillingProvider + 'static,
    I: IdentityVerifier + 'static,
{
    profile_repo: Arc<P>,
    subscription_repo: Arc<S>,
    billing_provider: Arc<B>,
    identity_verifier: Arc<I>,
    fallback_origin: String,
}

impl<P, S, B, I> CheckoutUseCase<P, S, B, I>
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeSubscriptionRepository + Send + Sync + 'static,
    B: BillingProvider + 'static,
    I: IdentityVerifier + 'static,
{
    pub fn new(
        profile_repo: Arc<P>,
        subscription_repo: Arc<S>,
        billing_provider: Arc<B>,
        identity_verifier: Arc<I>,
        fallback_origin: String,
    ) -> Self {
        Self {
            profile_repo,
            subscription_repo,
            billing_provider,
            identity_verifier,
            fallback_origin,
        }
    }

    /// Returns the hosted checkout URL for `price_id`.
    pub async fn create_checkout_session(
        &self,
        token: Option<&str>,
        price_id: Option<String>,
        origin: Option<String>,
    ) -> UseCaseResult<String> {
        let user = self.authenticate(token)?;

        let price_id = price_id
            .map(|price_id| price_id.trim().to_string())
            .filter(|price_id| !price_id.is_empty())
            .ok_or_else(|| {
                warn!(user_id = %user.user_id, "checkout: request without price id");
                BillingError::InvalidRequest("No price ID provided".to_string())
            })?;

        self.ensure_profile(&user).await?;
        let customer_id = self.resolve_customer_id(&user).await?;

        let origin = self.origin_or_fallback(origin);
        let request = CheckoutSessionRequest {
            customer_id: customer_id.clone(),
            price_id: price_id.clone(),
            user_id: user.user_id,
            success_url: format!("{origin}/?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{origin}/"),
        };

        let url = self
            .billing_provider
            .create_checkout_session(request)
            .await
            .map_err(|err| {
                error!(
                    user_id = %user.user_id,
                    stripe_customer_id = %customer_id,
                    price_id = %price_id,
                    error = ?err,
                    "checkout: failed to create checkout session"
                );
                BillingError::CheckoutCreation(err.to_string())
            })?;

        info!(
            user_id = %user.user_id,
            stripe_customer_id = %customer_id,
            price_id = %price_id,
            "checkout: checkout session created"
        );

        Ok(url)
    }

    fn authenticate(&self, token: Option<&str>) -> UseCaseResult<AuthUser> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(BillingError::AuthenticationRequired)?;

        self.identity_verifier.resolve_user(token).map_err(|err| {
            warn!(error = %err, "checkout: bearer token rejected");
            BillingError::AuthenticationRequired
        })
    }

    async fn ensure_profile(&self, user: &AuthUser) -> UseCaseResult<()> {
        self.profile_repo
            .create_if_absent(InsertProfileEntity {
                id: user.user_id,
                email: Some(user.email.clone()),
            })
            .await
            .map_err(|err| {
                error!(
                    user_id = %user.user_id,
                    db_error = ?err,
                    "checkout: failed to provision profile"
                );
                BillingError::Persistence(err)
            })
    }

    async fn resolve_customer_id(&self, user: &AuthUser) -> UseCaseResult<String> {
        let existing = self
            .subscription_repo
            .find_by_user_id(user.user_id)
            .await
            .map_err(|err| {
                error!(
                    user_id = %user.user_id,
                    db_error = ?err,
                    "checkout: failed to look up stripe customer"
                );
                BillingError::Persistence(err)
            })?
            .map(|row| row.stripe_customer_id)
            .filter(|customer_id| !customer_id.is_empty());

        if let Some(customer_id) = existing {
            return Ok(customer_id);
        }

        let customer_id = self
            .billing_provider
            .create_customer(&user.email, user.user_id)
            .await
            .map_err(|err| {
                error!(
                    user_id = %user.user_id,
                    error = ?err,
                    "checkout: failed to create stripe customer"
                );
                BillingError::CheckoutCreation(err.to_string())
            })?;

        self.store_customer_placeholder(user.user_id, &customer_id)
            .await?;

        info!(
            user_id = %user.user_id,
            stripe_customer_id = %customer_id,
            "checkout: stripe customer created"
        );

        Ok(customer_id)
    }

    async fn store_customer_placeholder(&self, user_id: Uuid, customer_id: &str) -> UseCaseResult<()> {
        self.subscription_repo
            .insert_customer_placeholder(InsertCustomerPlaceholderEntity {
                user_id,
                stripe_customer_id: customer_id.to_string(),
                stripe_subscription_id: String::new(),
                is_active: false,
                updated_at: Utc::now(),
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    stripe_customer_id = %customer_id,
                    db_error = ?err,
                    "checkout: failed to store stripe customer"
                );
                BillingError::Persistence(err)
            })
    }

    fn origin_or_fallback(&self, origin: Option<String>) -> String {
        origin
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty() && origin != "null")
            .unwrap_or_else(|| self.fallback_origin.trim_end_matches('/').to_string())
    }
}
