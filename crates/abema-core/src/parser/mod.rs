//! JSON-LD parsers for abema.tv pages
//!
//! Contains the block scanner and one module per kind of data recovered
//! from it.

pub mod blocks;
pub mod episodes;
pub mod synopsis;
pub mod title;

pub use blocks::{decode_json_escapes, scan_blocks};
pub use episodes::{EpisodeIdStrategy, parse_episodes, parse_episodes_with};
pub use synopsis::extract_description;
pub use title::{UNKNOWN_SERIES_TITLE, resolve_title};
