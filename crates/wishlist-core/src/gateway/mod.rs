//! ============================================================================
//! Gateway Module - Catalog and inventory collaborators
//! ============================================================================
//! The wishlist core never owns item or ownership data. It talks to two
//! read-only collaborators through these traits:
//! - CatalogGateway: case-insensitive item lookup and the full item list
//! - InventoryGateway: owned-copy counts and top collectors
//!
//! `MemoryCatalog` and `MemoryInventory` are in-process implementations
//! loaded from JSON fixtures.
//!
//! ## Usage
//! ```rust,ignore
//! use wishlist_core::gateway::{CatalogGateway, MemoryCatalog};
//!
//! let catalog = MemoryCatalog::from_json(r#"[{"name": "France", "icon": "🇫🇷", "rarity": 0.2}]"#)?;
//! let item = catalog.resolve("france").await?;
//! ```
//! ============================================================================

mod catalog;
mod inventory;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{CatalogItem, Collector, ItemName, UserId};

pub use catalog::{CatalogRecord, MemoryCatalog};
pub use inventory::{MemoryInventory, PlayerRecord};

/// Read-only item catalog
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Case-insensitive exact match on the canonical name
    async fn resolve(&self, name: &str) -> Result<Option<CatalogItem>>;

    /// Every catalog item, enabled or not, in no particular order
    async fn all_items(&self) -> Result<Vec<CatalogItem>>;
}

/// Read-only ownership source
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Number of instances of `item` held by `user`
    async fn count_owned(&self, user: UserId, item: &ItemName) -> Result<u64>;

    /// Users with the most items, largest first. With `members`, only those
    /// users are ranked.
    async fn top_collectors(&self, limit: usize, members: Option<&[UserId]>) -> Result<Vec<Collector>>;
}
