use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use tracing::info;

use crate::{config::PortalConfig, store::Store};

#[derive(Clone)]
pub struct AppState {
    config: Arc<PortalConfig>,
    store: Store,
}

impl AppState {
    pub async fn new(config: PortalConfig) -> Result<Self> {
        let store = Store::open(&config.data_dir)
            .await
            .context("failed to open data store")?;

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create upload directory {}",
                    config.upload_dir.display()
                )
            })?;

        Ok(Self {
            config: Arc::new(config),
            store,
        })
    }

    /// Make sure the admin record exists so the first login has something to check.
    pub async fn ensure_seed_admin(&self) -> Result<()> {
        let existed = self.store.admin().path().exists();
        let admin = self
            .store
            .admin()
            .read()
            .await
            .context("failed to load admin record")?;

        if !existed {
            info!(
                email = %admin.email,
                "Seeded default admin account with the built-in password. Update it promptly."
            );
        }

        Ok(())
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn upload_dir(&self) -> &Path {
        &self.config.upload_dir
    }
}
