//! ============================================================================
//! Reconciler - Annotates a wishlist snapshot with icons and ownership
//! ============================================================================
//! One catalog lookup and one inventory count per entry, each bounded by the
//! configured timeout. A failed or slow lookup only degrades its own entry:
//! - catalog miss / error / timeout -> placeholder icon
//! - inventory error / timeout      -> `Unknown` ownership
//!
//! Entries run concurrently (bounded) and come back in snapshot order.
//! ============================================================================

use futures_util::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::WishlistConfig;
use crate::gateway::{CatalogGateway, InventoryGateway};
use crate::types::{ItemName, Ownership, UserId, WishlistError, WishlistLine};

/// Icon shown when the catalog can no longer describe an entry
pub const PLACEHOLDER_ICON: &str = "❔";

pub struct Reconciler {
    catalog: Arc<dyn CatalogGateway>,
    inventory: Arc<dyn InventoryGateway>,
    timeout: Duration,
    concurrency: usize,
}

impl Reconciler {
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        inventory: Arc<dyn InventoryGateway>,
        config: &WishlistConfig,
    ) -> Self {
        Self {
            catalog,
            inventory,
            timeout: config.gateway_timeout(),
            concurrency: config.reconcile_concurrency.max(1),
        }
    }

    /// Build one display line per snapshot entry, preserving order
    pub async fn reconcile(&self, user: UserId, snapshot: &[ItemName]) -> Vec<WishlistLine> {
        debug!("Reconciling {} entries for user {}", snapshot.len(), user);

        stream::iter(snapshot.iter().cloned())
            .map(|name| self.reconcile_entry(user, name))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn reconcile_entry(&self, user: UserId, name: ItemName) -> WishlistLine {
        let (icon, ownership) = tokio::join!(self.icon_for(&name), self.ownership_for(user, &name));
        WishlistLine {
            name,
            icon,
            ownership,
        }
    }

    async fn icon_for(&self, name: &ItemName) -> String {
        match bounded(self.timeout, "resolve", self.catalog.resolve(name.as_str())).await {
            Ok(Some(item)) => item.icon_ref,
            Ok(None) => {
                debug!("{} is no longer in the catalog", name);
                PLACEHOLDER_ICON.to_string()
            }
            Err(e) => {
                warn!("Icon lookup for {} failed: {}", name, e);
                PLACEHOLDER_ICON.to_string()
            }
        }
    }

    async fn ownership_for(&self, user: UserId, name: &ItemName) -> Ownership {
        match bounded(self.timeout, "count_owned", self.inventory.count_owned(user, name)).await {
            Ok(count) => Ownership::from_count(count),
            Err(e) => {
                warn!("Ownership lookup for {} (user {}) failed: {}", name, user, e);
                Ownership::Unknown
            }
        }
    }
}

/// Run a gateway call under `timeout`, mapping failures into [`WishlistError`]
pub(crate) async fn bounded<T, F>(timeout: Duration, operation: &str, call: F) -> Result<T, WishlistError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(WishlistError::Gateway(e.to_string())),
        Err(_) => Err(WishlistError::GatewayTimeout {
            operation: operation.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
