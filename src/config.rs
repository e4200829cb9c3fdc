use std::{env, path::PathBuf};

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_UPLOAD_DIR: &str = "public/uploads";
const DEFAULT_MAX_UPLOAD_MB: usize = 100;
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Runtime settings read from the process environment.
#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Lowercase extensions accepted for uploads; empty accepts everything.
    pub allowed_extensions: Vec<String>,
}

impl PortalConfig {
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got `{value}`"))?,
            Err(_) => DEFAULT_PORT,
        };

        let max_upload_mb: usize = match env::var("PORTAL_MAX_UPLOAD_MB") {
            Ok(value) => value.trim().parse().with_context(|| {
                format!("PORTAL_MAX_UPLOAD_MB must be a whole number, got `{value}`")
            })?,
            Err(_) => DEFAULT_MAX_UPLOAD_MB,
        };

        let allowed_extensions = env::var("PORTAL_ALLOWED_EXTENSIONS")
            .map(|raw| parse_extension_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            port,
            data_dir: env_path("PORTAL_DATA_DIR", DEFAULT_DATA_DIR),
            upload_dir: env_path("PORTAL_UPLOAD_DIR", DEFAULT_UPLOAD_DIR),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            allowed_extensions,
        })
    }

    /// Settings rooted at an arbitrary directory, used by tests and tooling.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            port: DEFAULT_PORT,
            data_dir: root.join(DEFAULT_DATA_DIR),
            upload_dir: root.join(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            allowed_extensions: Vec::new(),
        }
    }
}

/// Password used by the seeding program for the fresh admin record.
pub fn seed_admin_password() -> String {
    env::var("PORTAL_ADMIN_PASSWORD")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string())
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_list_is_normalized() {
        let parsed = parse_extension_list(" PDF, .docx,,pptx ");
        assert_eq!(parsed, vec!["pdf", "docx", "pptx"]);
    }

    #[test]
    fn rooted_config_nests_directories() {
        let config = PortalConfig::rooted_at("/tmp/portal");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/portal/data"));
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/portal/public/uploads"));
        assert!(config.allowed_extensions.is_empty());
    }
}
