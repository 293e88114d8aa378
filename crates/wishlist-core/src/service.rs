//! ============================================================================
//! Wishlist Service - Command surface for the wishlist
//! ============================================================================
//! Turns transport-agnostic commands into replies:
//! - view / add / remove / purge operate on the invoker's wishlist
//! - rarity / leaderboard are public listings sharing the paginator
//!
//! Every reachable state maps to a defined reply; gateway trouble during
//! resolution becomes a "try again" message rather than an error.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::WishlistConfig;
use crate::gateway::{CatalogGateway, InventoryGateway};
use crate::listing::{leaderboard_lines, rarity_lines, LEADERBOARD_TITLE, RARITY_TITLE};
use crate::paginate::{BlockPaginator, Page};
use crate::reconcile::{bounded, Reconciler};
use crate::store::WishlistStore;
use crate::types::{AddOutcome, CatalogItem, RemoveOutcome, UserId, WishlistError, WishlistLine};

const ITEM_NOT_FOUND: &str = "That item doesn't exist.";
const CATALOG_UNAVAILABLE: &str = "The catalog is unavailable right now, please try again later.";
const INVENTORY_UNAVAILABLE: &str = "Player data is unavailable right now, please try again later.";

/// Who ran the command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoker {
    pub id: UserId,
    pub name: String,
}

impl Invoker {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "command")]
pub enum Command {
    View,
    Add { item: String },
    Remove { item: String },
    Purge,
    Rarity {
        #[serde(default = "default_true")]
        chunked: bool,
        #[serde(default)]
        include_disabled: bool,
    },
    Leaderboard {
        /// Rank only these users (the invoking server's members)
        #[serde(default)]
        server_members: Option<Vec<UserId>>,
    },
}

fn default_true() -> bool {
    true
}

/// What the transport should send back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Reply {
    Message {
        text: String,
        ephemeral: bool,
    },
    Paged {
        title: String,
        description: Option<String>,
        pages: Vec<Page>,
        ephemeral: bool,
    },
}

impl Reply {
    fn private(text: impl Into<String>) -> Self {
        Reply::Message {
            text: text.into(),
            ephemeral: true,
        }
    }

    fn public(text: impl Into<String>) -> Self {
        Reply::Message {
            text: text.into(),
            ephemeral: false,
        }
    }

    /// Message text, if this is a plain message
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Message { text, .. } => Some(text),
            Reply::Paged { .. } => None,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        match self {
            Reply::Message { ephemeral, .. } | Reply::Paged { ephemeral, .. } => *ephemeral,
        }
    }
}

pub struct WishlistService {
    store: Arc<WishlistStore>,
    catalog: Arc<dyn CatalogGateway>,
    inventory: Arc<dyn InventoryGateway>,
    reconciler: Reconciler,
    paginator: BlockPaginator,
    config: WishlistConfig,
}

impl WishlistService {
    pub fn new(
        store: Arc<WishlistStore>,
        catalog: Arc<dyn CatalogGateway>,
        inventory: Arc<dyn InventoryGateway>,
        config: WishlistConfig,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(Arc::clone(&catalog), Arc::clone(&inventory), &config),
            paginator: BlockPaginator::from_config(&config),
            store,
            catalog,
            inventory,
            config,
        }
    }

    pub fn store(&self) -> &WishlistStore {
        &self.store
    }

    fn timeout(&self) -> Duration {
        self.config.gateway_timeout()
    }

    // ========================================================================
    // Wishlist Operations
    // ========================================================================

    /// Resolve `item` (enabled items only) and add it to the user's wishlist
    pub async fn add(&self, user: UserId, item: &str) -> Result<(CatalogItem, AddOutcome), WishlistError> {
        let resolved = self
            .resolve(item)
            .await?
            .filter(|resolved| resolved.enabled)
            .ok_or_else(|| WishlistError::ItemNotFound(item.to_string()))?;
        let outcome = self.store.add(user, &resolved.name);
        Ok((resolved, outcome))
    }

    /// Resolve `item` (disabled items included) and drop it from the wishlist
    pub async fn remove(&self, user: UserId, item: &str) -> Result<(CatalogItem, RemoveOutcome), WishlistError> {
        let resolved = self
            .resolve(item)
            .await?
            .ok_or_else(|| WishlistError::ItemNotFound(item.to_string()))?;
        let outcome = self.store.remove(user, &resolved.name);
        Ok((resolved, outcome))
    }

    pub fn purge(&self, user: UserId) -> usize {
        self.store.purge(user)
    }

    /// Snapshot plus reconciliation, in display order
    pub async fn lines(&self, user: UserId) -> Vec<WishlistLine> {
        let snapshot = self.store.snapshot(user);
        self.reconciler.reconcile(user, &snapshot).await
    }

    async fn resolve(&self, item: &str) -> Result<Option<CatalogItem>, WishlistError> {
        bounded(self.timeout(), "resolve", self.catalog.resolve(item)).await
    }

    // ========================================================================
    // Command Dispatch
    // ========================================================================

    pub async fn handle(&self, invoker: &Invoker, command: Command) -> Reply {
        info!("User {} ({}) ran {:?}", invoker.name, invoker.id, command);

        match command {
            Command::View => self.view(invoker).await,
            Command::Add { item } => self.handle_add(invoker.id, &item).await,
            Command::Remove { item } => self.handle_remove(invoker.id, &item).await,
            Command::Purge => self.handle_purge(invoker.id),
            Command::Rarity {
                chunked,
                include_disabled,
            } => self.rarity(chunked, include_disabled).await,
            Command::Leaderboard { server_members } => self.leaderboard(server_members.as_deref()).await,
        }
    }

    pub async fn view(&self, invoker: &Invoker) -> Reply {
        let lines = self.lines(invoker.id).await;
        if lines.is_empty() {
            return Reply::private("Your wishlist is empty!");
        }

        let rendered = lines.iter().map(WishlistLine::render);
        Reply::Paged {
            title: format!("{}'s Wishlist", invoker.name),
            description: Some(format!("Your wishlist has {} item/s.", lines.len())),
            pages: self.paginator.paginate(rendered),
            ephemeral: true,
        }
    }

    async fn handle_add(&self, user: UserId, item: &str) -> Reply {
        match self.add(user, item).await {
            Ok((resolved, AddOutcome::Added)) => {
                Reply::private(format!("{} has been added to your wishlist!", labelled(&resolved)))
            }
            Ok((resolved, AddOutcome::AlreadyPresent)) => {
                Reply::private(format!("{} is already in your wishlist.", resolved.name))
            }
            Err(e) => resolution_failure(e),
        }
    }

    async fn handle_remove(&self, user: UserId, item: &str) -> Reply {
        match self.remove(user, item).await {
            Ok((resolved, RemoveOutcome::Removed)) => {
                Reply::private(format!("{} has been removed from your wishlist!", labelled(&resolved)))
            }
            Ok((resolved, RemoveOutcome::NotPresent)) => {
                Reply::private(format!("{} is not in your wishlist.", resolved.name))
            }
            Err(e) => resolution_failure(e),
        }
    }

    fn handle_purge(&self, user: UserId) -> Reply {
        match self.purge(user) {
            0 => Reply::private("Your wishlist is already empty."),
            count => Reply::private(format!("Cleared {} items from your wishlist!", count)),
        }
    }

    // ========================================================================
    // Listings
    // ========================================================================

    pub async fn rarity(&self, chunked: bool, include_disabled: bool) -> Reply {
        let items = match bounded(self.timeout(), "all_items", self.catalog.all_items()).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Rarity listing failed: {}", e);
                return Reply::public(CATALOG_UNAVAILABLE);
            }
        };

        let lines = rarity_lines(items, chunked, include_disabled);
        if lines.is_empty() {
            return Reply::public("No items found.");
        }

        let paginator = self.paginator.clone().with_title(RARITY_TITLE);
        Reply::Paged {
            title: RARITY_TITLE.to_string(),
            description: None,
            pages: paginator.paginate(lines),
            ephemeral: false,
        }
    }

    /// Global ranking, or only `server_members` when given
    pub async fn leaderboard(&self, server_members: Option<&[UserId]>) -> Reply {
        let size = self.config.leaderboard_size;
        let collectors = match bounded(
            self.timeout(),
            "top_collectors",
            self.inventory.top_collectors(size, server_members),
        )
        .await
        {
            Ok(collectors) => collectors,
            Err(e) => {
                warn!("Leaderboard failed: {}", e);
                return Reply::public(INVENTORY_UNAVAILABLE);
            }
        };

        if collectors.is_empty() {
            return Reply::public("No players found.");
        }

        let title = match server_members {
            Some(_) => format!("🏆 Top {} Server Collectors 🏆", size),
            None => format!("🏆 Top {} Collectors 🏆", size),
        };
        let paginator = self.paginator.clone().with_title(LEADERBOARD_TITLE);
        Reply::Paged {
            title,
            description: None,
            pages: paginator.paginate(leaderboard_lines(&collectors)),
            ephemeral: false,
        }
    }
}

/// `"<icon> <name>"`, or just the name when the item has no icon
fn labelled(item: &CatalogItem) -> String {
    if item.icon_ref.is_empty() {
        item.name.to_string()
    } else {
        format!("{} {}", item.icon_ref, item.name)
    }
}

fn resolution_failure(error: WishlistError) -> Reply {
    match error {
        WishlistError::ItemNotFound(_) => Reply::private(ITEM_NOT_FOUND),
        other => {
            warn!("Item resolution failed: {}", other);
            Reply::private(CATALOG_UNAVAILABLE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MemoryCatalog, MemoryInventory};
    use crate::types::{Collector, ItemName};
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct Harness {
        service: WishlistService,
        catalog: Arc<MemoryCatalog>,
        inventory: Arc<MemoryInventory>,
    }

    fn harness(config: WishlistConfig) -> Harness {
        let catalog = Arc::new(MemoryCatalog::from_items([
            CatalogItem::new("France", "🇫🇷", 0.2, true),
            CatalogItem::new("Chile", "🇨🇱", 0.3, true),
            CatalogItem::new("Peru", "", 0.4, true),
            CatalogItem::new("Atlantis", "🌊", 0.01, false),
        ]));
        let inventory = Arc::new(MemoryInventory::new());
        let service = WishlistService::new(
            Arc::new(WishlistStore::new()),
            catalog.clone(),
            inventory.clone(),
            config,
        );
        Harness {
            service,
            catalog,
            inventory,
        }
    }

    struct SlowCatalog;

    #[async_trait]
    impl CatalogGateway for SlowCatalog {
        async fn resolve(&self, _name: &str) -> anyhow::Result<Option<CatalogItem>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn all_items(&self) -> anyhow::Result<Vec<CatalogItem>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    struct BrokenInventory;

    #[async_trait]
    impl InventoryGateway for BrokenInventory {
        async fn count_owned(&self, _user: UserId, _item: &ItemName) -> anyhow::Result<u64> {
            Err(anyhow!("inventory offline"))
        }

        async fn top_collectors(
            &self,
            _limit: usize,
            _members: Option<&[UserId]>,
        ) -> anyhow::Result<Vec<Collector>> {
            Err(anyhow!("inventory offline"))
        }
    }

    fn slow_config() -> WishlistConfig {
        WishlistConfig {
            gateway_timeout_ms: 30,
            ..WishlistConfig::default()
        }
    }

    fn service_with(catalog: Arc<dyn CatalogGateway>, inventory: Arc<dyn InventoryGateway>) -> WishlistService {
        WishlistService::new(Arc::new(WishlistStore::new()), catalog, inventory, slow_config())
    }

    fn global_leaderboard() -> Command {
        Command::Leaderboard { server_members: None }
    }

    fn alice() -> Invoker {
        Invoker::new(UserId(1), "alice")
    }

    fn add(item: &str) -> Command {
        Command::Add { item: item.into() }
    }

    fn remove(item: &str) -> Command {
        Command::Remove { item: item.into() }
    }

    #[tokio::test]
    async fn test_add_then_duplicate() {
        let h = harness(WishlistConfig::default());
        let first = h.service.handle(&alice(), add("france")).await;
        assert_eq!(first.text(), Some("🇫🇷 France has been added to your wishlist!"));
        assert!(first.is_ephemeral());

        let second = h.service.handle(&alice(), add("FRANCE")).await;
        assert_eq!(second.text(), Some("France is already in your wishlist."));
        assert_eq!(h.service.store().len(UserId(1)), 1);
    }

    #[tokio::test]
    async fn test_add_unknown_or_disabled() {
        let h = harness(WishlistConfig::default());
        let unknown = h.service.handle(&alice(), add("Narnia")).await;
        assert_eq!(unknown.text(), Some(ITEM_NOT_FOUND));

        let disabled = h.service.add(UserId(1), "Atlantis").await.unwrap_err();
        assert_eq!(disabled, WishlistError::ItemNotFound("Atlantis".into()));
        assert!(h.service.store().is_empty(UserId(1)));
    }

    #[tokio::test]
    async fn test_remove_flow() {
        let h = harness(WishlistConfig::default());
        let missing = h.service.handle(&alice(), remove("Peru")).await;
        assert_eq!(missing.text(), Some("Peru is not in your wishlist."));

        h.service.handle(&alice(), add("Peru")).await;
        let removed = h.service.handle(&alice(), remove("peru")).await;
        assert_eq!(removed.text(), Some("Peru has been removed from your wishlist!"));
        assert!(h.service.store().snapshot(UserId(1)).is_empty());

        let unknown = h.service.handle(&alice(), remove("Narnia")).await;
        assert_eq!(unknown.text(), Some(ITEM_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_disabled_item_can_still_be_removed_and_viewed() {
        let h = harness(WishlistConfig::default());
        h.service.handle(&alice(), add("France")).await;
        h.catalog.set_enabled("France", false).await;

        let Reply::Paged { pages, .. } = h.service.handle(&alice(), Command::View).await else {
            panic!("expected paged reply");
        };
        assert_eq!(pages[0].blocks[0].body, "🇫🇷 France - Not owned\n");

        let removed = h.service.handle(&alice(), remove("France")).await;
        assert_eq!(removed.text(), Some("🇫🇷 France has been removed from your wishlist!"));
    }

    #[tokio::test]
    async fn test_purge_messages() {
        let h = harness(WishlistConfig::default());
        let empty = h.service.handle(&alice(), Command::Purge).await;
        assert_eq!(empty.text(), Some("Your wishlist is already empty."));

        for item in ["France", "Chile", "Peru"] {
            h.service.handle(&alice(), add(item)).await;
        }
        let cleared = h.service.handle(&alice(), Command::Purge).await;
        assert_eq!(cleared.text(), Some("Cleared 3 items from your wishlist!"));

        let again = h.service.handle(&alice(), Command::Purge).await;
        assert_eq!(again.text(), Some("Your wishlist is already empty."));
    }

    #[tokio::test]
    async fn test_view_empty() {
        let h = harness(WishlistConfig::default());
        let reply = h.service.handle(&Invoker::new(UserId(77), "newcomer"), Command::View).await;
        assert_eq!(reply, Reply::private("Your wishlist is empty!"));
    }

    #[tokio::test]
    async fn test_view_renders_ownership() {
        let h = harness(WishlistConfig::default());
        h.inventory.grant(UserId(1), "Chile", 3).await;
        for item in ["Peru", "France", "chile"] {
            h.service.handle(&alice(), add(item)).await;
        }

        match h.service.handle(&alice(), Command::View).await {
            Reply::Paged {
                title,
                description,
                pages,
                ephemeral,
            } => {
                assert_eq!(title, "alice's Wishlist");
                assert_eq!(description.as_deref(), Some("Your wishlist has 3 item/s."));
                assert!(ephemeral);
                assert_eq!(pages.len(), 1);
                assert_eq!(pages[0].blocks.len(), 1);
                assert_eq!(pages[0].blocks[0].title, "Wishlist");
                assert_eq!(
                    pages[0].blocks[0].body,
                    "🇨🇱 Chile - Owned (3)\n🇫🇷 France - Not owned\nPeru - Not owned\n"
                );
            }
            other => panic!("expected paged reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_view_splits_into_parts() {
        let h = harness(WishlistConfig {
            max_block_chars: 30,
            ..WishlistConfig::default()
        });
        for item in ["France", "Chile", "Peru"] {
            h.service.handle(&alice(), add(item)).await;
        }

        let Reply::Paged { pages, .. } = h.service.handle(&alice(), Command::View).await else {
            panic!("expected paged reply");
        };
        let titles: Vec<_> = pages[0].blocks.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Wishlist", "Wishlist (Part 2)", "Wishlist (Part 3)"]);
    }

    #[tokio::test]
    async fn test_view_survives_deleted_item() {
        let h = harness(WishlistConfig::default());
        h.service.handle(&alice(), add("Chile")).await;
        h.service.handle(&alice(), add("France")).await;
        h.catalog.remove("Chile").await;

        let lines = h.service.lines(UserId(1)).await;
        let rendered: Vec<_> = lines.iter().map(WishlistLine::render).collect();
        assert_eq!(rendered, vec!["❔ Chile - Not owned", "🇫🇷 France - Not owned"]);
    }

    #[tokio::test]
    async fn test_users_isolated() {
        let h = harness(WishlistConfig::default());
        let bob = Invoker::new(UserId(2), "bob");
        h.service.handle(&alice(), add("France")).await;
        h.service.handle(&bob, add("Chile")).await;
        h.service.handle(&alice(), Command::Purge).await;

        let names: Vec<_> = h.service.store().snapshot(bob.id).iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["Chile"]);
    }

    #[tokio::test]
    async fn test_rarity_listing() {
        let h = harness(WishlistConfig::default());
        let reply = h
            .service
            .handle(
                &alice(),
                Command::Rarity {
                    chunked: true,
                    include_disabled: false,
                },
            )
            .await;

        let Reply::Paged { pages, ephemeral, .. } = reply else {
            panic!("expected paged reply");
        };
        assert!(!ephemeral);
        assert_eq!(pages[0].blocks[0].title, RARITY_TITLE);
        assert_eq!(
            pages[0].blocks[0].body,
            "1. 🇫🇷 France - 20.00%\n2. 🇨🇱 Chile - 30.00%\n3. Peru - 40.00%\n"
        );
    }

    #[tokio::test]
    async fn test_leaderboard() {
        let h = harness(WishlistConfig::default());
        let empty = h.service.handle(&alice(), global_leaderboard()).await;
        assert_eq!(empty, Reply::public("No players found."));

        h.inventory.grant(UserId(1), "France", 4).await;
        h.inventory.set_display_name(UserId(1), "alice").await;
        let Reply::Paged { title, pages, .. } = h.service.handle(&alice(), global_leaderboard()).await else {
            panic!("expected paged reply");
        };
        assert_eq!(title, "🏆 Top 20 Collectors 🏆");
        assert_eq!(pages[0].blocks[0].body, "1. 🥇 alice - 4 collected\n");
    }

    #[tokio::test]
    async fn test_server_leaderboard() {
        let h = harness(WishlistConfig::default());
        h.inventory.grant(UserId(1), "France", 4).await;
        h.inventory.set_display_name(UserId(1), "alice").await;
        h.inventory.grant(UserId(2), "Chile", 9).await;
        h.inventory.set_display_name(UserId(2), "bob").await;
        h.inventory.grant(UserId(3), "Peru", 1).await;
        h.inventory.set_display_name(UserId(3), "carol").await;

        let command = Command::Leaderboard {
            server_members: Some(vec![UserId(1), UserId(3)]),
        };
        let Reply::Paged { title, pages, .. } = h.service.handle(&alice(), command).await else {
            panic!("expected paged reply");
        };
        assert_eq!(title, "🏆 Top 20 Server Collectors 🏆");
        assert_eq!(
            pages[0].blocks[0].body,
            "1. 🥇 alice - 4 collected\n2. 🥈 carol - 1 collected\n"
        );

        let lonely = Command::Leaderboard {
            server_members: Some(vec![UserId(99)]),
        };
        assert_eq!(
            h.service.handle(&alice(), lonely).await,
            Reply::public("No players found.")
        );
    }

    #[tokio::test]
    async fn test_catalog_timeout_gives_try_again() {
        let service = service_with(Arc::new(SlowCatalog), Arc::new(MemoryInventory::new()));

        let added = service.handle(&alice(), add("France")).await;
        assert_eq!(added, Reply::private(CATALOG_UNAVAILABLE));
        assert!(service.store().is_empty(UserId(1)));

        let removed = service.handle(&alice(), remove("France")).await;
        assert_eq!(removed, Reply::private(CATALOG_UNAVAILABLE));

        let err = service.add(UserId(1), "France").await.unwrap_err();
        assert_eq!(
            err,
            WishlistError::GatewayTimeout {
                operation: "resolve".into(),
                timeout_ms: 30,
            }
        );
    }

    #[tokio::test]
    async fn test_rarity_catalog_timeout() {
        let service = service_with(Arc::new(SlowCatalog), Arc::new(MemoryInventory::new()));
        let reply = service
            .handle(
                &alice(),
                Command::Rarity {
                    chunked: true,
                    include_disabled: false,
                },
            )
            .await;
        assert_eq!(reply, Reply::public(CATALOG_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_rarity_with_nothing_listed() {
        let h = harness(WishlistConfig::default());
        for item in ["France", "Chile", "Peru"] {
            h.catalog.set_enabled(item, false).await;
        }
        let reply = h.service.rarity(true, false).await;
        assert_eq!(reply, Reply::public("No items found."));
    }

    #[tokio::test]
    async fn test_leaderboard_inventory_failure() {
        let catalog = Arc::new(MemoryCatalog::new());
        let service = service_with(catalog, Arc::new(BrokenInventory));
        let reply = service.handle(&alice(), global_leaderboard()).await;
        assert_eq!(reply, Reply::public(INVENTORY_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_view_degrades_when_catalog_slow() {
        let store = Arc::new(WishlistStore::new());
        let france = CatalogItem::new("France", "🇫🇷", 0.2, true);
        store.add(UserId(1), &france.name);

        let service = WishlistService::new(
            store,
            Arc::new(SlowCatalog),
            Arc::new(MemoryInventory::new()),
            slow_config(),
        );
        let lines = service.lines(UserId(1)).await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].render(), "❔ France - Not owned");
    }

    #[test]
    fn test_command_json() {
        let command: Command = serde_json::from_str(r#"{"command": "add", "item": "France"}"#).unwrap();
        assert_eq!(command, add("France"));

        let leaderboard: Command = serde_json::from_str(r#"{"command": "leaderboard"}"#).unwrap();
        assert_eq!(leaderboard, global_leaderboard());

        let server: Command =
            serde_json::from_str(r#"{"command": "leaderboard", "server_members": [1, 2]}"#).unwrap();
        assert_eq!(
            server,
            Command::Leaderboard {
                server_members: Some(vec![UserId(1), UserId(2)])
            }
        );

        let rarity: Command = serde_json::from_str(r#"{"command": "rarity"}"#).unwrap();
        assert_eq!(
            rarity,
            Command::Rarity {
                chunked: true,
                include_disabled: false
            }
        );
    }
}
