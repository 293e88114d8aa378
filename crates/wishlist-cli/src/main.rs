// ============================================================================
// wishlist — Command-line driver for the wishlist core
// ============================================================================
// Usage:
//   wishlist repl --catalog items.json [--inventory players.json]
//   wishlist rarity --catalog items.json [--unchunked] [--include-disabled]
//   wishlist leaderboard --inventory players.json [--members 1,2,3]
//   wishlist paginate notes.txt [--title Notes]
//
// The wishlist store lives in memory, so state only lasts for one `repl`
// session.
// ============================================================================

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use wishlist_core::{
    BlockPaginator, Command, Invoker, MemoryCatalog, MemoryInventory, Page, Reply, UserId,
    WishlistConfig, WishlistService, WishlistStore,
};

/// Wishlist command driver
#[derive(Parser)]
#[command(name = "wishlist", version, about = "Run wishlist commands against JSON fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session reading one command per line from stdin
    Repl {
        /// Catalog fixture (JSON array of items)
        #[arg(long)]
        catalog: PathBuf,

        /// Inventory fixture (JSON array of players)
        #[arg(long)]
        inventory: Option<PathBuf>,

        /// Initial invoker id
        #[arg(long, default_value = "1")]
        user_id: u64,

        /// Initial invoker display name
        #[arg(long, default_value = "you")]
        user_name: String,
    },

    /// Print the rarity listing
    Rarity {
        #[arg(long)]
        catalog: PathBuf,

        /// Give every item its own rank instead of sharing ranks on ties
        #[arg(long)]
        unchunked: bool,

        /// Include disabled and zero-rarity items
        #[arg(long)]
        include_disabled: bool,
    },

    /// Print the top collectors
    Leaderboard {
        #[arg(long)]
        inventory: PathBuf,

        /// Rank only these user ids (a server's members)
        #[arg(long, value_delimiter = ',')]
        members: Option<Vec<u64>>,
    },

    /// Split the lines of a text file into display blocks
    Paginate {
        file: PathBuf,

        /// Base title for the blocks
        #[arg(long, default_value = "Wishlist")]
        title: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wishlist_core=info".parse()?)
                .add_directive("wishlist=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = WishlistConfig::from_env()?;

    match cli.command {
        Commands::Repl {
            catalog,
            inventory,
            user_id,
            user_name,
        } => {
            let service = build_service(&catalog, inventory.as_deref(), config)?;
            cmd_repl(&service, Invoker::new(UserId(user_id), user_name)).await
        }
        Commands::Rarity {
            catalog,
            unchunked,
            include_disabled,
        } => {
            let service = build_service(&catalog, None, config)?;
            let reply = service.rarity(!unchunked, include_disabled).await;
            print_reply(&reply);
            Ok(())
        }
        Commands::Leaderboard { inventory, members } => {
            let members: Option<Vec<UserId>> = members.map(|ids| ids.into_iter().map(UserId).collect());
            let service = WishlistService::new(
                Arc::new(WishlistStore::new()),
                Arc::new(MemoryCatalog::new()),
                Arc::new(MemoryInventory::load(&inventory)?),
                config,
            );
            print_reply(&service.leaderboard(members.as_deref()).await);
            Ok(())
        }
        Commands::Paginate { file, title } => cmd_paginate(&file, &title, &config),
    }
}

fn build_service(
    catalog: &std::path::Path,
    inventory: Option<&std::path::Path>,
    config: WishlistConfig,
) -> Result<WishlistService> {
    let catalog = MemoryCatalog::load(catalog)?;
    let inventory = match inventory {
        Some(path) => MemoryInventory::load(path)?,
        None => MemoryInventory::new(),
    };
    Ok(WishlistService::new(
        Arc::new(WishlistStore::new()),
        Arc::new(catalog),
        Arc::new(inventory),
        config,
    ))
}

// ============================================================================
// REPL
// ============================================================================

enum Line {
    Run(Command),
    SwitchUser(Invoker),
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<Option<Line>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let parsed = match word.to_lowercase().as_str() {
        "view" => Line::Run(Command::View),
        "purge" => Line::Run(Command::Purge),
        "leaderboard" => Line::Run(Command::Leaderboard {
            server_members: parse_members(rest)?,
        }),
        "rarity" => Line::Run(Command::Rarity {
            chunked: !rest.split_whitespace().any(|f| f == "--unchunked"),
            include_disabled: rest.split_whitespace().any(|f| f == "--include-disabled"),
        }),
        "add" | "remove" if rest.is_empty() => anyhow::bail!("'{}' needs an item name", word),
        "add" => Line::Run(Command::Add { item: rest.to_string() }),
        "remove" => Line::Run(Command::Remove { item: rest.to_string() }),
        "as" => {
            let (id, name) = rest.split_once(' ').unwrap_or((rest, rest));
            let id: u64 = id
                .parse()
                .map_err(|_| anyhow::anyhow!("Usage: as <user-id> [name]"))?;
            Line::SwitchUser(Invoker::new(UserId(id), name.trim()))
        }
        "help" => Line::Help,
        "quit" | "exit" => Line::Quit,
        _ => anyhow::bail!("Unknown command '{}'. Type 'help' for a list.", word),
    };
    Ok(Some(parsed))
}

/// `--members 1,2,3` after `leaderboard`
fn parse_members(rest: &str) -> Result<Option<Vec<UserId>>> {
    let mut words = rest.split_whitespace();
    match words.next() {
        None => Ok(None),
        Some("--members") => {
            let ids = words
                .next()
                .ok_or_else(|| anyhow::anyhow!("Usage: leaderboard [--members <id,id,...>]"))?;
            let members = ids
                .split(',')
                .filter(|id| !id.is_empty())
                .map(|id| {
                    id.parse()
                        .map(UserId)
                        .map_err(|_| anyhow::anyhow!("'{}' is not a user id", id))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(members))
        }
        Some(other) => anyhow::bail!("Unknown leaderboard option '{}'", other),
    }
}

async fn cmd_repl(service: &WishlistService, mut invoker: Invoker) -> Result<()> {
    info!("Session started as {} ({})", invoker.name, invoker.id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(Line::Run(command))) => print_reply(&service.handle(&invoker, command).await),
            Ok(Some(Line::SwitchUser(next))) => {
                println!("Now acting as {} ({})", next.name, next.id);
                invoker = next;
            }
            Ok(Some(Line::Help)) => print_help(),
            Ok(Some(Line::Quit)) => break,
            Err(e) => println!("{}", e),
        }
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  view                         Show your wishlist");
    println!("  add <item>                   Add an item");
    println!("  remove <item>                Remove an item");
    println!("  purge                        Clear your wishlist");
    println!("  rarity [--unchunked] [--include-disabled]");
    println!("  leaderboard [--members <id,id,...>]");
    println!("  as <user-id> [name]          Switch user");
    println!("  quit");
}

// ============================================================================
// Output
// ============================================================================

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Message { text, .. } => println!("{}", text),
        Reply::Paged {
            title,
            description,
            pages,
            ..
        } => {
            println!("=== {} ===", title);
            if let Some(description) = description {
                println!("{}", description);
            }
            print_pages(pages);
        }
    }
}

fn print_pages(pages: &[Page]) {
    for page in pages {
        if pages.len() > 1 {
            println!("\n--- Page {}/{} ---", page.index + 1, pages.len());
        }
        for block in &page.blocks {
            println!("\n[{}]", block.title);
            print!("{}", block.body);
        }
    }
}

fn cmd_paginate(file: &std::path::Path, title: &str, config: &WishlistConfig) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    let pages = BlockPaginator::from_config(config)
        .with_title(title)
        .paginate(text.lines());

    if pages.is_empty() {
        println!("Nothing to paginate.");
        return Ok(());
    }
    print_pages(&pages);
    Ok(())
}
