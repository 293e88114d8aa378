//! ============================================================================
//! Block Paginator - Greedy line packing into size-bounded display blocks
//! ============================================================================
//! Lines are packed in order into blocks of at most `max_block_chars`
//! characters (each line counts one extra for its newline). Blocks are then
//! grouped into pages of at most `max_blocks_per_page`.
//!
//! A line that alone exceeds the limit gets a block to itself, uncut:
//! splitting could break a multi-codepoint emoji or custom emoji markup.
//! ============================================================================

use serde::{Deserialize, Serialize};

use crate::config::WishlistConfig;

/// Embed field value limit
pub const DEFAULT_MAX_BLOCK_CHARS: usize = 1024;

/// Embed field count limit
pub const DEFAULT_MAX_BLOCKS_PER_PAGE: usize = 25;

pub const DEFAULT_TITLE: &str = "Wishlist";

/// A titled run of lines that fits one display field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub title: String,
    /// Lines joined with a trailing `\n` after each
    pub body: String,
    pub line_count: usize,
}

impl Block {
    /// Length in characters, newlines included
    pub fn char_len(&self) -> usize {
        self.body.chars().count()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.body.lines()
    }
}

/// A group of blocks shown together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 0-based
    pub index: usize,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub struct BlockPaginator {
    max_block_chars: usize,
    max_blocks_per_page: usize,
    title: String,
}

impl Default for BlockPaginator {
    fn default() -> Self {
        Self {
            max_block_chars: DEFAULT_MAX_BLOCK_CHARS,
            max_blocks_per_page: DEFAULT_MAX_BLOCKS_PER_PAGE,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl BlockPaginator {
    /// Limits are floored at 1
    pub fn new(max_block_chars: usize, max_blocks_per_page: usize) -> Self {
        Self {
            max_block_chars: max_block_chars.max(1),
            max_blocks_per_page: max_blocks_per_page.max(1),
            ..Self::default()
        }
    }

    pub fn from_config(config: &WishlistConfig) -> Self {
        Self::new(config.max_block_chars, config.max_blocks_per_page)
    }

    /// Same limits, different block titles
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn max_block_chars(&self) -> usize {
        self.max_block_chars
    }

    pub fn max_blocks_per_page(&self) -> usize {
        self.max_blocks_per_page
    }

    /// Pack lines into titled blocks. No blocks for no lines.
    pub fn blocks<I, S>(&self, lines: I) -> Vec<Block>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut blocks = Vec::new();
        let mut body = String::new();
        let mut body_chars = 0usize;
        let mut line_count = 0usize;

        for line in lines {
            let line = line.as_ref();
            let line_chars = line.chars().count() + 1;

            if line_count > 0 && body_chars + line_chars > self.max_block_chars {
                let title = self.block_title(blocks.len() + 1);
                blocks.push(Block {
                    title,
                    body: std::mem::take(&mut body),
                    line_count,
                });
                body_chars = 0;
                line_count = 0;
            }

            body.push_str(line);
            body.push('\n');
            body_chars += line_chars;
            line_count += 1;
        }

        if line_count > 0 {
            let title = self.block_title(blocks.len() + 1);
            blocks.push(Block {
                title,
                body,
                line_count,
            });
        }

        blocks
    }

    /// Group blocks into pages of at most `max_blocks_per_page`
    pub fn pages(&self, blocks: Vec<Block>) -> Vec<Page> {
        blocks
            .chunks(self.max_blocks_per_page)
            .enumerate()
            .map(|(index, chunk)| Page {
                index,
                blocks: chunk.to_vec(),
            })
            .collect()
    }

    pub fn paginate<I, S>(&self, lines: I) -> Vec<Page>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pages(self.blocks(lines))
    }

    /// `"<title>"` for the first block, `"<title> (Part N)"` after
    fn block_title(&self, number: usize) -> String {
        if number > 1 {
            format!("{} (Part {})", self.title, number)
        } else {
            self.title.clone()
        }
    }
}
