//! Pool construction.

use crate::error::Result;
use persist_config::PersistConfig;
use sqlx::postgres::{PgPoolOptions, PgPool};
use std::time::Duration;

/// Open the Postgres pool. Fails loudly on connection failure — per
/// SPEC_FULL.md §7 item 5, fatal startup errors propagate out of bootstrap
/// and the process terminates; nothing here retries or reconnects.
pub async fn connect(config: &PersistConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.postgres_url())
        .await?;

    tracing::info!(db_name = %config.db_name, "connected to Postgres");
    Ok(pool)
}
