//! Main extraction API for abema.tv
//!
//! Sequences the page source and the parsers into a single run.

use chrono::Local;
use tracing::{debug, info};

use crate::client::{AbemaClient, ClientConfig, PageSource};
use crate::error::{AbemaError, Result};
use crate::parser::{EpisodeIdStrategy, extract_description, parse_episodes_with, resolve_title};
use crate::types::{Episode, SeriesDocument};
use crate::url::is_series_path;

/// Configuration for an extraction run
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Attempts for the series page fetch (default: 3)
    pub max_retries: u32,
    /// Attempts for each synopsis fetch (default: 1)
    pub synopsis_retries: u32,
    /// Upper bound on synopsis fetches per run, `None` for no bound
    pub synopsis_limit: Option<usize>,
    /// How episode identifiers are derived
    pub id_strategy: EpisodeIdStrategy,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            synopsis_retries: 1,
            synopsis_limit: None,
            id_strategy: EpisodeIdStrategy::default(),
        }
    }
}

/// Main extraction API for abema.tv
///
/// Combines a [`PageSource`] with the JSON-LD parsers. All requests are
/// issued one after another.
pub struct AbemaScraper<S = AbemaClient> {
    source: S,
    config: ScraperConfig,
}

impl AbemaScraper<AbemaClient> {
    /// Create a new scraper with default configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default(), ScraperConfig::default())
    }

    /// Create a new scraper with custom client and run configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn with_config(client_config: ClientConfig, config: ScraperConfig) -> Result<Self> {
        let client = AbemaClient::with_config(client_config)?;
        Ok(Self::with_source(client, config))
    }
}

impl<S: PageSource> AbemaScraper<S> {
    /// Create a scraper on top of any page source
    pub fn with_source(source: S, config: ScraperConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetch the synopsis of one episode
    ///
    /// Any fetch or parse failure yields `None`; a missing synopsis never
    /// aborts a run.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> abema_core::Result<()> {
    /// use abema_core::AbemaScraper;
    /// let scraper = AbemaScraper::new()?;
    /// let synopsis = scraper
    ///     .fetch_synopsis("https://abema.tv/video/episode/26-249_s1_p1")
    ///     .await;
    /// println!("{}", synopsis.unwrap_or_default());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_synopsis(&self, episode_url: &str) -> Option<String> {
        match self
            .source
            .fetch_page(episode_url, self.config.synopsis_retries)
            .await
        {
            Ok(html) => {
                let description = extract_description(&html);
                if description.is_none() {
                    debug!(episode_url, "no description on episode page");
                }
                description
            }
            Err(e) => {
                debug!(episode_url, error = %e, "synopsis unavailable");
                None
            }
        }
    }

    /// Attach synopses to episodes in order, skipping those without a URL
    ///
    /// Stops after `synopsis_limit` fetches when a limit is configured.
    pub async fn enrich_synopses(&self, episodes: &mut [Episode]) {
        let limit = self.config.synopsis_limit.unwrap_or(usize::MAX);
        let mut fetched = 0;

        for episode in episodes.iter_mut() {
            let Some(url) = episode.url.as_deref() else {
                debug!(number = episode.number, "episode has no URL, skipping synopsis");
                continue;
            };
            if fetched >= limit {
                info!(limit, "synopsis limit reached");
                break;
            }

            episode.synopsis = self.fetch_synopsis(url).await;
            fetched += 1;

            info!(
                number = episode.number,
                found = episode.synopsis.is_some(),
                "episode {} done",
                episode.number
            );
        }
    }

    /// Run one full extraction for a series page
    ///
    /// # Arguments
    /// * `series_url` - Series page URL (`https://abema.tv/video/title/...`)
    /// * `include_synopsis` - Whether to fetch each episode page for its synopsis
    ///
    /// # Returns
    /// The finished [`SeriesDocument`], dated today
    ///
    /// # Errors
    /// - `InvalidUrl` if the URL is not a series page, is outside the service
    ///   origin, or does not exist
    /// - `NetworkFailure` if the series page cannot be fetched
    ///
    /// Synopsis failures never surface here.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> abema_core::Result<()> {
    /// use abema_core::AbemaScraper;
    /// let scraper = AbemaScraper::new()?;
    /// let document = scraper
    ///     .extract_all("https://abema.tv/video/title/26-249", true)
    ///     .await?;
    /// println!("{}: {} episodes", document.title(), document.total_episodes());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn extract_all(&self, series_url: &str, include_synopsis: bool) -> Result<SeriesDocument> {
        if !is_series_path(series_url) {
            return Err(AbemaError::InvalidUrl(format!(
                "{} is not a series page (/video/title/<id>)",
                series_url
            )));
        }

        info!(series_url, "fetching series page");
        let html = self
            .source
            .fetch_page(series_url, self.config.max_retries)
            .await?;

        let title = resolve_title(&html);
        let mut episodes = parse_episodes_with(&html, series_url, self.config.id_strategy);
        info!(title = %title, episodes = episodes.len(), "parsed series page");

        if include_synopsis {
            self.enrich_synopses(&mut episodes).await;
        }

        Ok(SeriesDocument::new(
            title,
            series_url,
            Local::now().date_naive(),
            episodes,
        ))
    }
}
