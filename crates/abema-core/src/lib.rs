//! ABEMA Episode Metadata Core Library
//!
//! Recovers episode metadata from abema.tv series pages by reading the
//! JSON-LD blocks the site embeds in its server-rendered HTML.
//!
//! # Overview
//!
//! This crate provides:
//! - An HTTP client that only talks to the service origin, with retries and
//!   rate limiting
//! - Parsers for the series title (breadcrumb), the episode list (thumbnail
//!   captions) and episode synopses
//! - A high-level API running one complete extraction
//! - YAML rendering of the result
//!
//! # Example
//!
//! ```no_run
//! use abema_core::{AbemaScraper, OutputOptions, Result, render_yaml};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let scraper = AbemaScraper::new()?;
//!
//!     let document = scraper
//!         .extract_all("https://abema.tv/video/title/26-249", true)
//!         .await?;
//!
//!     for episode in document.episodes() {
//!         println!("第{}話 {}", episode.number, episode.title);
//!     }
//!
//!     let yaml = render_yaml(&document, &OutputOptions::default())?;
//!     println!("{}", yaml);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Episode identifiers
//!
//! Series pages do not expose per-episode identifiers. By default they are
//! reconstructed as `<series slug>_s1_p<number>`, which does not hold for
//! every title (multiple seasons, specials). See [`EpisodeIdStrategy`].

mod client;
mod error;
mod output;
pub mod parser;
mod scraper;
mod types;
pub mod url;

// Re-export client types
pub use client::{AbemaClient, ClientConfig, PageSource, RateLimiter};

// Re-export error types
pub use error::{AbemaError, Result};

// Re-export output rendering
pub use output::{OutputOptions, render_yaml};

// Re-export parser functions
pub use parser::{
    EpisodeIdStrategy, UNKNOWN_SERIES_TITLE, extract_description, parse_episodes,
    parse_episodes_with, resolve_title, scan_blocks,
};

// Re-export main scraper API
pub use scraper::{AbemaScraper, ScraperConfig};

// Re-export data types
pub use types::{Episode, SeriesDocument};

// Re-export URL helper functions for convenience
pub use url::{build_episode_url, derive_episode_id, extract_series_slug};
