use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use bytes::Bytes;

use crate::{
    application::{
        interfaces::billing_provider::BillingProvider,
        usercases::stripe_webhook::{ReconcileOutcome, StripeWebhookUseCase},
    },
    domain::{
        repositories::{
            profiles::ProfileRepository, stripe_subscriptions::StripeSubscriptionRepository,
        },
        value_objects::checkout::WebhookReceivedResponse,
    },
    infrastructure::{
        axum_http::{default_routers, error_responses::ApiError},
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                profiles::ProfilePostgres, stripe_subscriptions::StripeSubscriptionPostgres,
            },
        },
    },
    payments::stripe_client::StripeClient,
};

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    stripe_client: Arc<StripeClient>,
    webhook_secret: String,
) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let subscription_repository = StripeSubscriptionPostgres::new(Arc::clone(&db_pool));
    let stripe_webhook_usecase = StripeWebhookUseCase::new(
        Arc::new(profile_repository),
        Arc::new(subscription_repository),
        stripe_client,
        webhook_secret,
    );

    router(Arc::new(stripe_webhook_usecase))
}

pub fn router<P, S, B>(stripe_webhook_usecase: Arc<StripeWebhookUseCase<P, S, B>>) -> Router
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeSubscriptionRepository + Send + Sync + 'static,
    B: BillingProvider + 'static,
{
    Router::new()
        .route(
            "/",
            post(stripe_webhook::<P, S, B>).options(default_routers::preflight),
        )
        .with_state(stripe_webhook_usecase)
}

/// Takes the raw body: the signature covers the exact bytes Stripe sent.
pub async fn stripe_webhook<P, S, B>(
    State(stripe_webhook_usecase): State<Arc<StripeWebhookUseCase<P, S, B>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeSubscriptionRepository + Send + Sync + 'static,
    B: BillingProvider + 'static,
{
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match stripe_webhook_usecase
        .handle_stripe_webhook(&body, signature)
        .await
    {
        Ok(ReconcileOutcome::Applied) | Ok(ReconcileOutcome::Ignored) => (
            StatusCode::OK,
            Json(WebhookReceivedResponse { received: true }),
        )
            .into_response(),
        Ok(ReconcileOutcome::Failed(err)) | Err(err) => ApiError::webhook(&err).into_response(),
    }
}
