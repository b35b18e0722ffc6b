use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use super::settings::Settings;

pub(crate) async fn create_pool(settings: &Settings) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .min_connections(settings.db_min_connections)
        .idle_timeout(Duration::from_secs(settings.db_idle_timeout_secs))
        .connect(&settings.database_url)
        .await
        .context("failed to connect to database")?;

    info!(
        max_connections = settings.db_max_connections,
        "connected to database"
    );
    Ok(pool)
}

pub(crate) async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to run database migrations")?;
    Ok(())
}
