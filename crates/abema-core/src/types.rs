//! Core data types for the ABEMA metadata extractor

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One episode recovered from a series page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode number from the "第N話" caption, always positive
    pub number: u32,

    /// Episode subtitle with the thumbnail suffix removed
    pub title: String,

    /// Description from the episode's own page, filled by the enrichment pass
    pub synopsis: Option<String>,

    /// Canonical episode page URL, absent when no identifier could be derived
    pub url: Option<String>,

    /// Thumbnail image URL the episode was parsed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl Episode {
    /// Create an episode without synopsis, URL or thumbnail
    pub fn new(number: u32, title: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            synopsis: None,
            url: None,
            thumbnail_url: None,
        }
    }
}

/// The terminal artifact of one extraction run
///
/// Fields are private so the document cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDocument {
    title: String,
    source_url: String,
    extraction_date: NaiveDate,
    episodes: Vec<Episode>,
}

impl SeriesDocument {
    pub fn new(
        title: impl Into<String>,
        source_url: impl Into<String>,
        extraction_date: NaiveDate,
        episodes: Vec<Episode>,
    ) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            extraction_date,
            episodes,
        }
    }

    /// Series display name, or the fallback sentinel
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Date of the run, not of any episode
    pub fn extraction_date(&self) -> NaiveDate {
        self.extraction_date
    }

    /// Episodes sorted ascending by number
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn total_episodes(&self) -> usize {
        self.episodes.len()
    }
}
