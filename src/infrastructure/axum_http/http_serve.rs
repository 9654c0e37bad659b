use crate::{
    config::config_model::DotEnvyConfig,
    infrastructure::{
        axum_http::{
            default_routers::{self, CORS_ALLOW_HEADERS},
            routers,
        },
        postgres::postgres_connection::PgPoolSquad,
    },
    payments::stripe_client::StripeClient,
};
use anyhow::Result;
use axum::{
    Router,
    http::{HeaderName, Method},
    routing::get,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let stripe_client = Arc::new(StripeClient::new(config.stripe.secret_key.clone()));

    let api = Router::new()
        .nest(
            "/api/v1/stripe-webhook",
            routers::stripe_webhook::routes(
                Arc::clone(&db_pool),
                Arc::clone(&stripe_client),
                config.stripe.webhook_signing_secret.clone(),
            ),
        )
        .nest(
            "/api/v1/create-checkout-session",
            routers::checkout::routes(Arc::clone(&db_pool), Arc::clone(&stripe_client), &config),
        );

    let app = with_layers(api, &config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(port = config.server.port, "Server is running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Adds the default routes and the shared middleware stack to `api`.
pub fn with_layers(api: Router, config: &DotEnvyConfig) -> Result<Router> {
    let allow_headers: Vec<HeaderName> = CORS_ALLOW_HEADERS
        .split(", ")
        .map(HeaderName::from_static)
        .collect();

    let app = api
        .fallback(default_routers::not_found)
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes()?))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(allow_headers)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
