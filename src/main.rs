use anyhow::Result;
use socialspark::{
    config::config_loader,
    infrastructure::{axum_http::http_serve, postgres::postgres_connection},
    observability,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Billing service exited with error: {}", error);
        eprintln!("Billing service exited with error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("billing-api")?;

    let dotenvy_env = config_loader::load()?;
    info!(stage = %config_loader::get_stage(), "ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    http_serve::start(Arc::new(dotenvy_env), Arc::new(postgres_pool)).await?;

    Ok(())
}
