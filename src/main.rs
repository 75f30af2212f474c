//! KNUST Enterprise Hub server
//!
//! Configuration comes from the YAML file named by `HUB_CONFIG` (optional),
//! then from environment variables. Logging honours `RUST_LOG`.

use anyhow::{Context, Result};
use knust_hub::config::HubConfig;
use knust_hub::server::ServerBuilder;
use knust_hub::storage::{PostgresMarketplaceStore, postgres};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match std::env::var("HUB_CONFIG") {
        Ok(path) => HubConfig::from_yaml_file(&path)?,
        Err(_) => HubConfig::default(),
    }
    .with_env()
    .context("failed to load configuration")?;
    tracing::info!(
        bind_addr = %config.server.bind_addr,
        database = %config.database.name,
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(config.database.connect_options()?)
        .await
        .context("failed to connect to PostgreSQL")?;
    postgres::migrate(&pool).await?;

    let addr = config.server.bind_addr.clone();
    ServerBuilder::new()
        .with_store(PostgresMarketplaceStore::new(pool))
        .with_config(config)
        .serve(&addr)
        .await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("knust_hub=info,tower_http=info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
