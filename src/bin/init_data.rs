//! Resets the portal data to its initial state: `cargo run --bin init_data`.

use anyhow::{Context, Result};
use course_portal::{PortalConfig, config, seed};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();

    if let Err(err) = run().await {
        error!(?err, "data initialization failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = PortalConfig::from_env().context("invalid configuration")?;
    info!(data_dir = %config.data_dir.display(), "initializing portal data");

    let summary = seed::reset_data(&config, &config::seed_admin_password()).await?;

    info!(
        categories = summary.categories,
        uploads_removed = summary.uploads_removed,
        "data initialization complete; admin login is `admin`"
    );
    Ok(())
}
