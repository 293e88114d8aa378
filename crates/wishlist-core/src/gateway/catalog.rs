//! ============================================================================
//! Memory Catalog - In-process catalog backed by a JSON fixture
//! ============================================================================

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::CatalogGateway;
use crate::types::{fold_case, CatalogItem};

/// Fixture row for one catalog item
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub rarity: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl From<CatalogRecord> for CatalogItem {
    fn from(record: CatalogRecord) -> Self {
        CatalogItem::new(record.name, record.icon, record.rarity, record.enabled)
    }
}

/// Catalog held in memory, keyed by case-folded name
#[derive(Default)]
pub struct MemoryCatalog {
    items: Arc<RwLock<HashMap<String, CatalogItem>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let items = items
            .into_iter()
            .map(|item| (item.name.folded().to_string(), item))
            .collect();
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Parse a JSON array of [`CatalogRecord`]s
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<CatalogRecord> = serde_json::from_str(json)
            .map_err(|e| anyhow!("Failed to parse catalog fixture: {}", e))?;
        Ok(Self::from_items(records.into_iter().map(CatalogItem::from)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read catalog {}: {}", path.display(), e))?;
        let catalog = Self::from_json(&json)?;
        info!("Loaded catalog from {}", path.display());
        Ok(catalog)
    }

    /// Insert or replace an item
    pub async fn insert(&self, item: CatalogItem) {
        let mut items = self.items.write().await;
        debug!("Catalog upsert: {}", item.name);
        items.insert(item.name.folded().to_string(), item);
    }

    /// Delete an item; returns whether it existed
    pub async fn remove(&self, name: &str) -> bool {
        self.items.write().await.remove(&fold_case(name)).is_some()
    }

    /// Toggle availability; returns whether the item exists
    pub async fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.items.write().await.get_mut(&fold_case(name)) {
            Some(item) => {
                item.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CatalogGateway for MemoryCatalog {
    async fn resolve(&self, name: &str) -> Result<Option<CatalogItem>> {
        Ok(self.items.read().await.get(&fold_case(name)).cloned())
    }

    async fn all_items(&self) -> Result<Vec<CatalogItem>> {
        Ok(self.items.read().await.values().cloned().collect())
    }
}
