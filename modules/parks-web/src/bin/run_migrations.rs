//! Runs pending SQLx migrations against the database.
//!
//! Migrations are embedded at compile time, so no migration files
//! are needed at runtime.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use parks_common::Config;
use parks_store::PgParkStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("parks=info".parse()?))
        .init();

    let config = Config::from_env()?;

    info!("Running database migrations");
    let store = PgParkStore::connect(&config.database_url, 2).await?;
    store.migrate().await?;

    Ok(())
}
