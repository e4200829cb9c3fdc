//! Flat-file persistence: one pretty-printed JSON document per collection.
//!
//! Every write replaces the whole file and nothing coordinates concurrent
//! writers, so two interleaved read-modify-write cycles on one collection can
//! lose an update.

mod models;

use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::info;

pub use models::{Account, AccountProfile, Category, Material, Role, default_admin};

pub const ADMIN_FILE: &str = "admin.json";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const MATERIALS_FILE: &str = "materials.json";
pub const TEACHERS_FILE: &str = "teachers.json";

/// Anything stored in a collection keyed by a string id.
pub trait Record {
    fn id(&self) -> &str;
}

/// A single JSON file holding a value of type `T`.
#[derive(Debug, Clone)]
pub struct JsonFile<T> {
    path: PathBuf,
    default: fn() -> T,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>, default: fn() -> T) -> Self {
        Self {
            path: path.into(),
            default,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file, creating it with the default value when absent.
    pub async fn read(&self) -> Result<T> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to parse {}", self.path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let value = (self.default)();
                self.write(&value).await?;
                info!(file = %self.path.display(), "initialized data file");
                Ok(value)
            }
            Err(err) => {
                Err(err).with_context(|| format!("failed to read {}", self.path.display()))
            }
        }
    }

    /// Overwrite the file with `value`.
    pub async fn write(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let body = serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize {}", self.path.display()))?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

/// The four portal collections under one data directory.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
    admin: JsonFile<Account>,
    categories: JsonFile<Vec<Category>>,
    materials: JsonFile<Vec<Material>>,
    teachers: JsonFile<Vec<Account>>,
}

impl Store {
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        Ok(Self {
            admin: JsonFile::new(data_dir.join(ADMIN_FILE), default_admin),
            categories: JsonFile::new(data_dir.join(CATEGORIES_FILE), Vec::new),
            materials: JsonFile::new(data_dir.join(MATERIALS_FILE), Vec::new),
            teachers: JsonFile::new(data_dir.join(TEACHERS_FILE), Vec::new),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn admin(&self) -> &JsonFile<Account> {
        &self.admin
    }

    pub fn categories(&self) -> &JsonFile<Vec<Category>> {
        &self.categories
    }

    pub fn materials(&self) -> &JsonFile<Vec<Material>> {
        &self.materials
    }

    pub fn teachers(&self) -> &JsonFile<Vec<Account>> {
        &self.teachers
    }
}

pub fn find_index<T: Record>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Drop every record with `id`; returns whether the collection shrank.
pub fn remove_by_id<T: Record>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}

/// Millisecond timestamp id, bumped past the largest numeric id in `items`.
pub fn next_id<T: Record>(items: &[T]) -> String {
    next_id_at(items, Utc::now().timestamp_millis())
}

fn next_id_at<T: Record>(items: &[T], now_millis: i64) -> String {
    let highest = items
        .iter()
        .filter_map(|item| item.id().parse::<i64>().ok())
        .max();

    match highest.and_then(|highest| highest.checked_add(1)) {
        Some(bumped) if bumped > now_millis => bumped.to_string(),
        _ => now_millis.to_string(),
    }
}
