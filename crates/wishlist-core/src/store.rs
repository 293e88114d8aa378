//! ============================================================================
//! Wishlist Store - Per-user sets of canonical item names
//! ============================================================================
//! Process-wide, in-memory only: the store starts empty and nothing survives
//! a restart. Each user's set lives behind a dashmap shard lock, so calls for
//! the same user are serialized while different users proceed independently.
//! No lock is ever held across an await point.
//! ============================================================================

use dashmap::DashMap;
use std::collections::BTreeSet;
use tracing::debug;

use crate::types::{AddOutcome, ItemName, RemoveOutcome, UserId};

/// In-memory wishlist store shared by all command handlers
#[derive(Debug, Default)]
pub struct WishlistStore {
    wishlists: DashMap<UserId, BTreeSet<ItemName>>,
}

impl WishlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item`; re-adding an existing entry leaves state untouched
    pub fn add(&self, user: UserId, item: &ItemName) -> AddOutcome {
        let mut set = self.wishlists.entry(user).or_default();
        if set.insert(item.clone()) {
            debug!("User {} wishlisted {} ({} entries)", user, item, set.len());
            AddOutcome::Added
        } else {
            AddOutcome::AlreadyPresent
        }
    }

    pub fn remove(&self, user: UserId, item: &ItemName) -> RemoveOutcome {
        let Some(mut set) = self.wishlists.get_mut(&user) else {
            return RemoveOutcome::NotPresent;
        };
        if set.remove(item) {
            debug!("User {} unwishlisted {} ({} entries)", user, item, set.len());
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotPresent
        }
    }

    /// Clear the user's set, returning how many entries were dropped.
    /// The (now empty) set stays in the map.
    pub fn purge(&self, user: UserId) -> usize {
        match self.wishlists.get_mut(&user) {
            Some(mut set) => {
                let count = set.len();
                set.clear();
                if count > 0 {
                    debug!("Purged {} entries for user {}", count, user);
                }
                count
            }
            None => 0,
        }
    }

    /// Entries sorted case-insensitively; empty for unknown users
    pub fn snapshot(&self, user: UserId) -> Vec<ItemName> {
        self.wishlists
            .get(&user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, user: UserId) -> usize {
        self.wishlists.get(&user).map(|set| set.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, user: UserId) -> bool {
        self.len(user) == 0
    }

    /// Users with at least one entry
    pub fn user_count(&self) -> usize {
        self.wishlists.iter().filter(|entry| !entry.is_empty()).count()
    }
}
