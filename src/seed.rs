//! Resets the data directory to a fresh install.

use std::io::ErrorKind;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::PortalConfig,
    store::{Account, Category, Role, Store},
    web::auth,
};

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("2", "语文"),
    ("3", "数学"),
    ("4", "英语"),
    ("5", "政治"),
    ("1746103523031", "历史"),
    ("1746103739296", "地理"),
    ("1746106144699", "生物"),
    ("1746106151621", "物理"),
    ("1746106154703", "化学"),
    ("1746106156982", "其他"),
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub uploads_removed: usize,
}

/// Overwrite every collection with its initial contents and empty the uploads directory.
pub async fn reset_data(config: &PortalConfig, admin_password: &str) -> Result<SeedSummary> {
    let store = Store::open(&config.data_dir).await?;
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("failed to create {}", config.upload_dir.display()))?;

    let (password_hash, salt) = auth::salted_hash(admin_password);
    let admin = Account {
        id: "admin1".to_string(),
        name: "系统管理员".to_string(),
        email: "admin".to_string(),
        password_hash,
        salt,
        role: Role::Admin,
    };
    store.admin().write(&admin).await?;
    info!(file = %store.admin().path().display(), "wrote admin record");

    let categories: Vec<Category> = DEFAULT_CATEGORIES
        .iter()
        .map(|(id, name)| Category {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect();
    store.categories().write(&categories).await?;
    store.materials().write(&Vec::new()).await?;
    store.teachers().write(&Vec::new()).await?;
    info!(categories = categories.len(), "wrote collections");

    let uploads_removed = clear_uploads(config).await?;
    info!(uploads_removed, "cleared upload directory");

    Ok(SeedSummary {
        categories: categories.len(),
        uploads_removed,
    })
}

async fn clear_uploads(config: &PortalConfig) -> Result<usize> {
    let mut entries = match tokio::fs::read_dir(&config.upload_dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to list {}", config.upload_dir.display())
            });
        }
    };

    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("failed to read upload directory entry")?
    {
        let file_type = entry.file_type().await?;
        if !file_type.is_file() {
            continue;
        }
        tokio::fs::remove_file(entry.path())
            .await
            .with_context(|| format!("failed to remove {}", entry.path().display()))?;
        removed += 1;
    }

    Ok(removed)
}
