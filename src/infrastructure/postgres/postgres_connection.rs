use std::time::Duration;

use anyhow::{Context, Result};
use diesel::{
    Connection, PgConnection,
    connection::CacheSize,
    r2d2::{Builder, ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};
use tracing::info;

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

pub const POOL_MAX_SIZE: u32 = 8;
pub const POOL_CONNECTION_TIMEOUT_SECS: u64 = 10;

/// The Supabase transaction pooler rejects named prepared statements.
#[derive(Debug)]
struct UnnamedStatementsOnly;

impl CustomizeConnection<PgConnection, R2d2Error> for UnnamedStatementsOnly {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        Ok(())
    }
}

fn pool_builder() -> Builder<ConnectionManager<PgConnection>> {
    Pool::builder()
        .max_size(POOL_MAX_SIZE)
        .connection_timeout(Duration::from_secs(POOL_CONNECTION_TIMEOUT_SECS))
        .connection_customizer(Box::new(UnnamedStatementsOnly))
}

pub fn establish_connection(database_url: &str) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = pool_builder()
        .build(manager)
        .context("failed to open the postgres connection pool")?;

    info!(
        max_size = pool.max_size(),
        idle_connections = pool.state().idle_connections,
        "postgres pool ready"
    );

    Ok(pool)
}
