use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::ORIGIN},
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::debug;

use crate::{
    application::{
        interfaces::{billing_provider::BillingProvider, identity::IdentityVerifier},
        usercases::checkout::CheckoutUseCase,
    },
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{
            profiles::ProfileRepository, stripe_subscriptions::StripeSubscriptionRepository,
        },
        value_objects::checkout::{CreateCheckoutRequest, CreateCheckoutResponse},
    },
    infrastructure::{
        auth::SupabaseJwtVerifier,
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

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    stripe_client: Arc<StripeClient>,
    config: &DotEnvyConfig,
) -> Router {
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let subscription_repository = StripeSubscriptionPostgres::new(Arc::clone(&db_pool));
    let identity_verifier = SupabaseJwtVerifier::new(&config.supabase.jwt_secret);
    let checkout_usecase = CheckoutUseCase::new(
        Arc::new(profile_repository),
        Arc::new(subscription_repository),
        stripe_client,
        Arc::new(identity_verifier),
        config.checkout.fallback_origin.clone(),
    );

    router(Arc::new(checkout_usecase))
}

pub fn router<P, S, B, I>(checkout_usecase: Arc<CheckoutUseCase<P, S, B, I>>) -> Router
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeSubscriptionRepository + Send + Sync + 'static,
    B: BillingProvider + 'static,
    I: IdentityVerifier + 'static,
{
    Router::new()
        .route(
            "/",
            post(create_checkout_session::<P, S, B, I>).options(default_routers::preflight),
        )
        .with_state(checkout_usecase)
}

pub async fn create_checkout_session<P, S, B, I>(
    State(checkout_usecase): State<Arc<CheckoutUseCase<P, S, B, I>>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    headers: HeaderMap,
    payload: Result<Json<CreateCheckoutRequest>, JsonRejection>,
) -> Response
where
    P: ProfileRepository + Send + Sync + 'static,
    S: StripeSubscriptionRepository + Send + Sync + 'static,
    B: BillingProvider + 'static,
    I: IdentityVerifier + 'static,
{
    let token = bearer.as_ref().map(|TypedHeader(auth)| auth.token());
    let origin = headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    // An unreadable body is reported as a missing price once the caller is authenticated.
    let price_id = match payload {
        Ok(Json(request)) => request.price_id,
        Err(rejection) => {
            debug!(rejection = %rejection, "checkout: request body rejected");
            None
        }
    };

    match checkout_usecase
        .create_checkout_session(token, price_id, origin)
        .await
    {
        Ok(url) => (StatusCode::OK, Json(CreateCheckoutResponse { url })).into_response(),
        Err(err) => ApiError::checkout(&err).into_response(),
    }
}
