//! ============================================================================
//! Memory Inventory - In-process ownership counts backed by a JSON fixture
//! ============================================================================

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::InventoryGateway;
use crate::types::{fold_case, Collector, ItemName, UserId};

/// Fixture row for one player's holdings
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Item name -> owned count
    #[serde(default)]
    pub items: HashMap<String, u64>,
}

#[derive(Debug, Default, Clone)]
struct Holdings {
    display_name: String,
    counts: HashMap<String, u64>,
}

impl Holdings {
    fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Inventory held in memory
#[derive(Default)]
pub struct MemoryInventory {
    players: Arc<RwLock<HashMap<UserId, Holdings>>>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of [`PlayerRecord`]s
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<PlayerRecord> = serde_json::from_str(json)
            .map_err(|e| anyhow!("Failed to parse inventory fixture: {}", e))?;

        let players = records
            .into_iter()
            .map(|record| {
                let counts = record
                    .items
                    .into_iter()
                    .map(|(name, count)| (fold_case(&name), count))
                    .collect();
                (
                    UserId(record.id),
                    Holdings {
                        display_name: record.name,
                        counts,
                    },
                )
            })
            .collect();

        Ok(Self {
            players: Arc::new(RwLock::new(players)),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read inventory {}: {}", path.display(), e))?;
        let inventory = Self::from_json(&json)?;
        info!("Loaded inventory from {}", path.display());
        Ok(inventory)
    }

    /// Give `user` additional copies of an item
    pub async fn grant(&self, user: UserId, item: &str, count: u64) {
        let mut players = self.players.write().await;
        let holdings = players.entry(user).or_default();
        *holdings.counts.entry(fold_case(item)).or_insert(0) += count;
        debug!("Granted {} x{} to user {}", item, count, user);
    }

    pub async fn set_display_name(&self, user: UserId, name: impl Into<String>) {
        self.players.write().await.entry(user).or_default().display_name = name.into();
    }
}

#[async_trait]
impl InventoryGateway for MemoryInventory {
    async fn count_owned(&self, user: UserId, item: &ItemName) -> Result<u64> {
        let players = self.players.read().await;
        Ok(players
            .get(&user)
            .and_then(|h| h.counts.get(item.folded()))
            .copied()
            .unwrap_or(0))
    }

    async fn top_collectors(&self, limit: usize, members: Option<&[UserId]>) -> Result<Vec<Collector>> {
        let players = self.players.read().await;
        let mut collectors: Vec<Collector> = players
            .iter()
            .filter(|(user_id, _)| members.map_or(true, |members| members.contains(*user_id)))
            .map(|(user_id, holdings)| Collector {
                user_id: *user_id,
                display_name: if holdings.display_name.is_empty() {
                    user_id.to_string()
                } else {
                    holdings.display_name.clone()
                },
                item_count: holdings.total(),
            })
            .collect();

        // Ties broken by user id so the order is stable between calls
        collectors.sort_by(|a, b| {
            b.item_count
                .cmp(&a.item_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        collectors.truncate(limit);
        Ok(collectors)
    }
}
