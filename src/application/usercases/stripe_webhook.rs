use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    application::{
        errors::{BillingError, UseCaseResult},
        interfaces::billing_provider::BillingProvider,
    },
    domain::{
        repositories::{
            profiles::ProfileRepository, stripe_subscriptions::StripeSubscriptionRepository,
        },
        value_objects::stripe_subscriptions::SubscriptionRecord,
    },
    payments::{
        stripe_objects::{
            StripeCheckoutSession, StripeCustomer, StripeEvent, StripeEventKind,
            StripeSubscription,
        },
        webhook_signature,
    },
};

use super::subscription_format::format_subscription_data;

/// Result of reconciling one verified event.
#[derive(Debug)]
pub enum ReconcileOutcome {
    Applied,
    Ignored,
    Failed(BillingError),
}

/// Turns verified Stripe events into idempotent writes to `stripe_subscriptions`
/// and `profiles`. Holds no locks and performs no retries: Stripe redelivers
/// any event answered with an error.
pub struct StripeWebhookUseCase<P, S, B>
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeSubscriptionRepository + Send + Sync + 'static,
    B: BillingProvider + 'static,
{
    profile_repo: Arc<P>,
    subscription_repo: Arc<S>,
    billing_provider: Arc<B>,
    webhook_secret: String,
}

impl<P, S, B> StripeWebhookUseCase<P, S, B>
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeSubscriptionRepository + Send + Sync + 'static,
    B: BillingProvider + 'static,
{
    pub fn new(
        profile_repo: Arc<P>,
        subscription_repo: Arc<S>,
        billing_provider: Arc<B>,
        webhook_secret: String,
    ) -> Self {
        Self {
            profile_repo,
            subscription_repo,
            billing_provider,
            webhook_secret,
        }
    }

    /// Verifies the raw delivery and reconciles it. Verification problems are
    /// returned as `Err`; processing problems come back as `ReconcileOutcome::Failed`.
    pub async fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> UseCaseResult<ReconcileOutcome> {
        let signature = signature.ok_or_else(|| {
            let err = BillingError::SignatureInvalid("missing stripe-signature header".to_string());
            warn!(
                payload_len = payload.len(),
                status = err.status_code().as_u16(),
                "stripe_webhook: signature header missing"
            );
            err
        })?;

        let event = webhook_signature::verify_webhook_event(payload, signature, &self.webhook_secret)
            .map_err(|err| {
                let err = BillingError::from(err);
                warn!(
                    error = %err,
                    payload_len = payload.len(),
                    status = err.status_code().as_u16(),
                    "stripe_webhook: verification failed"
                );
                err
            })?;

        info!(
            event_id = %event.id,
            event_type = %event.type_,
            "stripe_webhook: event verified"
        );

        Ok(self.reconcile(&event).await)
    }

    pub async fn reconcile(&self, event: &StripeEvent) -> ReconcileOutcome {
        let kind = event.kind();
        if !kind.is_handled() {
            debug!(
                event_id = %event.id,
                event_type = %event.type_,
                "stripe_webhook: unhandled event type ignored"
            );
            return ReconcileOutcome::Ignored;
        }

        match self.apply_event(event, &kind).await {
            Ok(record) => {
                info!(
                    event_id = %event.id,
                    event_type = %event.type_,
                    user_id = %record.user_id,
                    stripe_customer_id = %record.stripe_customer_id,
                    stripe_subscription_id = %record.stripe_subscription_id,
                    status = %record.status,
                    is_active = record.is_active,
                    "stripe_webhook: event applied"
                );
                ReconcileOutcome::Applied
            }
            Err(err) => {
                error!(
                    event_id = %event.id,
                    event_type = %event.type_,
                    error = %err,
                    "stripe_webhook: event processing failed"
                );
                ReconcileOutcome::Failed(err)
            }
        }
    }

    async fn apply_event(
        &self,
        event: &StripeEvent,
        kind: &StripeEventKind,
    ) -> UseCaseResult<SubscriptionRecord> {
        let (subscription, customer) = self.resolve_subscription_and_customer(event, kind).await?;
        let user_id = self.resolve_profile_id(&customer).await?;

        let record = format_subscription_data(&subscription, &customer, user_id, Utc::now());

        // Subscription row first, so a failure never leaves a premium profile without one.
        self.upsert_subscription(&record).await?;
        self.apply_premium_status(user_id, record.is_active).await?;

        Ok(record)
    }

    pub async fn resolve_subscription_and_customer(
        &self,
        event: &StripeEvent,
        kind: &StripeEventKind,
    ) -> UseCaseResult<(StripeSubscription, StripeCustomer)> {
        let subscription = match kind {
            StripeEventKind::CheckoutSessionCompleted => {
                let session: StripeCheckoutSession =
                    serde_json::from_value(event.data.object.clone()).map_err(|err| {
                        BillingError::MalformedEvent(format!("invalid checkout session payload: {err}"))
                    })?;

                let (Some(customer_ref), Some(subscription_ref)) =
                    (session.customer.as_ref(), session.subscription.as_ref())
                else {
                    let err = BillingError::MalformedEvent(
                        "no customer or subscription found in session".to_string(),
                    );
                    warn!(
                        event_id = %event.id,
                        checkout_session_id = %session.id,
                        has_customer = session.customer.is_some(),
                        has_subscription = session.subscription.is_some(),
                        "stripe_webhook: checkout session missing references"
                    );
                    return Err(err);
                };

                let subscription_id = subscription_ref.id();
                info!(
                    event_id = %event.id,
                    checkout_session_id = %session.id,
                    stripe_customer_id = %customer_ref.id(),
                    stripe_subscription_id = %subscription_id,
                    "stripe_webhook: retrieving subscription from stripe"
                );

                self.billing_provider
                    .retrieve_subscription(subscription_id)
                    .await
                    .map_err(|err| {
                        error!(
                            event_id = %event.id,
                            stripe_subscription_id = %subscription_id,
                            error = ?err,
                            "stripe_webhook: failed to retrieve subscription"
                        );
                        BillingError::Provider(err)
                    })?
            }
            StripeEventKind::SubscriptionCreated
            | StripeEventKind::SubscriptionUpdated
            | StripeEventKind::SubscriptionDeleted => {
                serde_json::from_value(event.data.object.clone()).map_err(|err| {
                    BillingError::MalformedEvent(format!("invalid subscription payload: {err}"))
                })?
            }
            StripeEventKind::Other(event_type) => {
                return Err(BillingError::MalformedEvent(format!(
                    "unsupported event type: {event_type}"
                )));
            }
        };

        let customer_id = subscription.customer.id().to_string();
        let customer = self
            .billing_provider
            .retrieve_customer(&customer_id)
            .await
            .map_err(|err| {
                error!(
                    event_id = %event.id,
                    stripe_customer_id = %customer_id,
                    error = ?err,
                    "stripe_webhook: failed to retrieve customer"
                );
                BillingError::Provider(err)
            })?;

        match customer {
            Some(customer) if !customer.deleted => Ok((subscription, customer)),
            Some(_) => Err(BillingError::CustomerUnavailable(format!(
                "customer {customer_id} has been deleted"
            ))),
            None => Err(BillingError::CustomerUnavailable(format!(
                "customer {customer_id} not found"
            ))),
        }
    }

    /// Metadata first, then the customer's email.
    pub async fn resolve_profile_id(&self, customer: &StripeCustomer) -> UseCaseResult<Uuid> {
        if let Some(user_id) = customer.profile_id_from_metadata() {
            let profile = self.profile_repo.find_by_id(user_id).await.map_err(|err| {
                error!(
                    stripe_customer_id = %customer.id,
                    %user_id,
                    db_error = ?err,
                    "stripe_webhook: failed to load profile from customer metadata"
                );
                BillingError::Persistence(err)
            })?;

            if profile.is_some() {
                return Ok(user_id);
            }

            warn!(
                stripe_customer_id = %customer.id,
                %user_id,
                "stripe_webhook: metadata profile id has no profile, falling back to email"
            );
        }

        let Some(email) = customer.email.clone() else {
            warn!(
                stripe_customer_id = %customer.id,
                "stripe_webhook: customer has neither a usable profile id nor an email"
            );
            return Err(BillingError::ProfileNotFound(customer.id.clone()));
        };

        let user_id = self
            .profile_repo
            .find_id_by_email(email.clone())
            .await
            .map_err(|err| {
                error!(
                    stripe_customer_id = %customer.id,
                    db_error = ?err,
                    "stripe_webhook: failed to look up profile by email"
                );
                BillingError::Persistence(err)
            })?;

        user_id.ok_or_else(|| {
            warn!(
                stripe_customer_id = %customer.id,
                email = %email,
                "stripe_webhook: no profile matches customer email"
            );
            BillingError::ProfileNotFound(format!("{} ({email})", customer.id))
        })
    }

    async fn upsert_subscription(&self, record: &SubscriptionRecord) -> UseCaseResult<()> {
        self.subscription_repo
            .upsert_subscription(record.clone().into())
            .await
            .map_err(|err| {
                error!(
                    user_id = %record.user_id,
                    stripe_customer_id = %record.stripe_customer_id,
                    stripe_subscription_id = %record.stripe_subscription_id,
                    status = %record.status,
                    db_error = ?err,
                    "stripe_webhook: failed to upsert subscription"
                );
                BillingError::Persistence(err)
            })
    }

    async fn apply_premium_status(&self, user_id: Uuid, is_active: bool) -> UseCaseResult<()> {
        self.profile_repo
            .update_premium_status(user_id, is_active)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    is_active,
                    db_error = ?err,
                    "stripe_webhook: failed to update premium status"
                );
                BillingError::Persistence(err)
            })
    }
}
