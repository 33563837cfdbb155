//! Synopsis extraction for episode pages

use super::blocks::{Block, scan_blocks};

/// Extracts the episode description from an episode page
///
/// Returns the first non-empty `description` found in the page's JSON-LD
/// blocks, with escape sequences decoded. `None` when there is none.
pub fn extract_description(html: &str) -> Option<String> {
    scan_blocks(html)
        .map(Block::parse)
        .filter(|block| block.has_field("description"))
        .find_map(|block| block.first_string("description"))
        .filter(|description| !description.trim().is_empty())
}
