//! ============================================================================
//! Configuration - Display limits and gateway budgets
//! ============================================================================
//! Defaults match the embed limits of the chat transport. Every field can be
//! overridden from the environment:
//!
//! | Variable                          | Field                   |
//! |-----------------------------------|-------------------------|
//! | `WISHLIST_BLOCK_LIMIT`            | `max_block_chars`       |
//! | `WISHLIST_BLOCKS_PER_PAGE`        | `max_blocks_per_page`   |
//! | `WISHLIST_GATEWAY_TIMEOUT_MS`     | `gateway_timeout_ms`    |
//! | `WISHLIST_RECONCILE_CONCURRENCY`  | `reconcile_concurrency` |
//! | `WISHLIST_LEADERBOARD_SIZE`       | `leaderboard_size`      |
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::paginate::{DEFAULT_MAX_BLOCKS_PER_PAGE, DEFAULT_MAX_BLOCK_CHARS};
use crate::types::WishlistError;

/// Per-call budget for catalog and inventory lookups
pub const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 2_000;

/// Wishlist entries reconciled in parallel
pub const DEFAULT_RECONCILE_CONCURRENCY: usize = 8;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WishlistConfig {
    /// Maximum characters per display block
    pub max_block_chars: usize,
    /// Maximum blocks per page
    pub max_blocks_per_page: usize,
    /// Timeout for each gateway round trip
    pub gateway_timeout_ms: u64,
    /// Entries reconciled concurrently
    pub reconcile_concurrency: usize,
    /// Rows shown by the leaderboard
    pub leaderboard_size: usize,
}

impl Default for WishlistConfig {
    fn default() -> Self {
        Self {
            max_block_chars: DEFAULT_MAX_BLOCK_CHARS,
            max_blocks_per_page: DEFAULT_MAX_BLOCKS_PER_PAGE,
            gateway_timeout_ms: DEFAULT_GATEWAY_TIMEOUT_MS,
            reconcile_concurrency: DEFAULT_RECONCILE_CONCURRENCY,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
        }
    }
}

impl WishlistConfig {
    /// Defaults overridden by `WISHLIST_*` environment variables
    pub fn from_env() -> Result<Self, WishlistError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WishlistError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        override_from(&lookup, "WISHLIST_BLOCK_LIMIT", &mut config.max_block_chars)?;
        override_from(&lookup, "WISHLIST_BLOCKS_PER_PAGE", &mut config.max_blocks_per_page)?;
        override_from(&lookup, "WISHLIST_GATEWAY_TIMEOUT_MS", &mut config.gateway_timeout_ms)?;
        override_from(&lookup, "WISHLIST_RECONCILE_CONCURRENCY", &mut config.reconcile_concurrency)?;
        override_from(&lookup, "WISHLIST_LEADERBOARD_SIZE", &mut config.leaderboard_size)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WishlistError> {
        let zero = [
            ("max_block_chars", self.max_block_chars == 0),
            ("max_blocks_per_page", self.max_blocks_per_page == 0),
            ("gateway_timeout_ms", self.gateway_timeout_ms == 0),
            ("reconcile_concurrency", self.reconcile_concurrency == 0),
        ];
        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((field, _)) => Err(WishlistError::InvalidConfig(format!("{} must be greater than 0", field))),
            None => Ok(()),
        }
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_ms)
    }
}

fn override_from<F, T>(lookup: &F, key: &str, field: &mut T) -> Result<(), WishlistError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    if let Some(raw) = lookup(key) {
        *field = raw
            .trim()
            .parse()
            .map_err(|_| WishlistError::InvalidConfig(format!("{}={:?} is not a valid number", key, raw)))?;
        debug!("Config override {} = {:?}", key, field);
    }
    Ok(())
}
