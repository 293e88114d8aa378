//! ============================================================================
//! WISHLIST-CORE: Per-user collectible wishlists
//! ============================================================================
//! This crate handles all backend logic for the wishlist commands:
//! - In-memory per-user wishlist store keyed by canonical item names
//! - Catalog / inventory gateways for item lookup and ownership counts
//! - Reconciliation of a wishlist into ownership-annotated display lines
//! - Greedy block pagination shared with the rarity and leaderboard listings
//! ============================================================================

pub mod config;
pub mod gateway;
pub mod listing;
pub mod paginate;
pub mod reconcile;
pub mod service;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use types::*;
pub use config::WishlistConfig;
pub use gateway::{CatalogGateway, InventoryGateway, MemoryCatalog, MemoryInventory};
pub use paginate::{Block, BlockPaginator, Page};
pub use reconcile::Reconciler;
pub use service::{Command, Invoker, Reply, WishlistService};
pub use store::WishlistStore;
