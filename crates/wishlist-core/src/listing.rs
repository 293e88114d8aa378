//! Line sources for the public rarity and leaderboard listings.
//! Both feed the same [`crate::BlockPaginator`] as the wishlist view.

use std::cmp::Ordering;

use crate::types::{CatalogItem, Collector};

pub const RARITY_TITLE: &str = "Rarity List";
pub const LEADERBOARD_TITLE: &str = "Top Collectors";

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// Rarest first. With `chunked`, items sharing a rarity share a rank and the
/// next rank skips past the group (1, 1, 3, ...). Disabled items and items
/// with zero rarity are dropped unless `include_disabled` is set.
pub fn rarity_lines(mut items: Vec<CatalogItem>, chunked: bool, include_disabled: bool) -> Vec<String> {
    if !include_disabled {
        items.retain(|item| item.enabled && item.rarity > 0.0);
    }
    items.sort_by(|a, b| {
        a.rarity
            .partial_cmp(&b.rarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut lines = Vec::with_capacity(items.len());
    let mut rank = 1;
    for (position, item) in items.iter().enumerate() {
        if !chunked {
            rank = position + 1;
        } else if position > 0 && item.rarity != items[position - 1].rarity {
            rank = position + 1;
        }
        lines.push(rarity_line(rank, item));
    }
    lines
}

fn rarity_line(rank: usize, item: &CatalogItem) -> String {
    let percentage = item.rarity * 100.0;
    if item.icon_ref.is_empty() {
        format!("{}. {} - {:.2}%", rank, item.name, percentage)
    } else {
        format!("{}. {} {} - {:.2}%", rank, item.icon_ref, item.name, percentage)
    }
}

/// One line per collector, already ordered by the inventory
pub fn leaderboard_lines(collectors: &[Collector]) -> Vec<String> {
    collectors
        .iter()
        .enumerate()
        .map(|(i, collector)| match MEDALS.get(i) {
            Some(medal) => format!(
                "{}. {} {} - {} collected",
                i + 1,
                medal,
                collector.display_name,
                collector.item_count
            ),
            None => format!(
                "{}. {} - {} collected",
                i + 1,
                collector.display_name,
                collector.item_count
            ),
        })
        .collect()
}
