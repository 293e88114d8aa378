//! ============================================================================
//! Shared Types - Identities, catalog records, outcomes, and errors
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// Identity Types
// ============================================================================

/// Opaque user identity (a platform snowflake)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId(id)
    }
}

/// Canonical item identity.
///
/// Only a [`CatalogItem`] hands these out, so every name held by the store
/// has been resolved against the catalog at some point. Equality, hashing
/// and ordering use the case-folded form; display keeps the catalog casing.
#[derive(Debug, Clone)]
pub struct ItemName {
    canonical: String,
    folded: String,
}

impl ItemName {
    fn from_canonical(canonical: String) -> Self {
        let canonical = canonical.trim().to_string();
        let folded = fold_case(&canonical);
        Self { canonical, folded }
    }

    /// The catalog's authoritative casing
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Case-folded lookup key
    pub fn folded(&self) -> &str {
        &self.folded
    }
}

impl PartialEq for ItemName {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for ItemName {}

impl Hash for ItemName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl Ord for ItemName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl PartialOrd for ItemName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl Serialize for ItemName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

/// Case folding used for every item-name comparison
pub fn fold_case(name: &str) -> String {
    name.trim().to_lowercase()
}

// ============================================================================
// Catalog Types
// ============================================================================

/// A catalog record as returned by a [`crate::CatalogGateway`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub name: ItemName,
    /// Display icon (emoji or custom emoji markup); empty when unset
    pub icon_ref: String,
    /// Spawn rarity in [0, 1]
    pub rarity: f64,
    pub enabled: bool,
}

impl CatalogItem {
    /// Build a catalog record; `name` becomes the canonical identity
    pub fn new(name: impl Into<String>, icon_ref: impl Into<String>, rarity: f64, enabled: bool) -> Self {
        Self {
            name: ItemName::from_canonical(name.into()),
            icon_ref: icon_ref.into(),
            rarity: rarity.clamp(0.0, 1.0),
            enabled,
        }
    }
}

/// One row of the collector leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collector {
    pub user_id: UserId,
    pub display_name: String,
    pub item_count: u64,
}

// ============================================================================
// Store Outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed,
    NotPresent,
}

// ============================================================================
// Reconciled View
// ============================================================================

/// Ownership status of a single wishlist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "count")]
pub enum Ownership {
    Owned(u64),
    NotOwned,
    /// The inventory could not be queried in time
    Unknown,
}

impl Ownership {
    pub fn from_count(count: u64) -> Self {
        if count > 0 {
            Ownership::Owned(count)
        } else {
            Ownership::NotOwned
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ownership::Owned(count) => write!(f, "Owned ({})", count),
            Ownership::NotOwned => f.write_str("Not owned"),
            Ownership::Unknown => f.write_str("Unknown"),
        }
    }
}

/// A display-ready wishlist entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishlistLine {
    pub name: ItemName,
    pub icon: String,
    pub ownership: Ownership,
}

impl WishlistLine {
    /// `"<icon> <name> - <status>"`, dropping the icon slot when empty
    pub fn render(&self) -> String {
        if self.icon.is_empty() {
            format!("{} - {}", self.name, self.ownership)
        } else {
            format!("{} {} - {}", self.icon, self.name, self.ownership)
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error types for the wishlist core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum WishlistError {
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Gateway timed out after {timeout_ms}ms during {operation}")]
    GatewayTimeout { operation: String, timeout_ms: u64 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
