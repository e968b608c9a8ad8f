use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use parks_common::Config;
use parks_store::PgParkStore;
use parks_web::{build_router, AppState, SmtpMailer};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("parks=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let store = PgParkStore::connect(&config.database_url, config.database_max_connections).await?;
    store.migrate().await?;

    let mailer = SmtpMailer::new(&config.smtp)?;

    info!(
        site_domain = %config.site_domain,
        admins = config.admins.len(),
        transit_distance_miles = config.transit_distance_miles,
        "Configuration loaded"
    );

    let state = Arc::new(AppState {
        store: Arc::new(store),
        mailer: Arc::new(mailer),
        site_domain: config.site_domain.clone(),
        admins: config.admin_emails(),
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Boston Parks web server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
