//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use abema_core::{ClientConfig, EpisodeIdStrategy, OutputOptions, ScraperConfig};
use clap::Parser;

/// Extract episode titles and synopses from an ABEMA series page into YAML.
#[derive(Parser, Debug)]
#[command(name = "abema-meta")]
#[command(author, version, about)]
#[command(after_help = "Examples:\n  abema-meta https://abema.tv/video/title/26-249\n  abema-meta https://abema.tv/video/title/189-85 -o output.yaml --no-synopsis")]
pub struct Args {
    /// Series page URL (e.g. https://abema.tv/video/title/189-85)
    pub url: String,

    /// Output YAML file
    #[arg(short, long, default_value = "episodes_output.yaml")]
    pub output: PathBuf,

    /// Skip fetching each episode page for its synopsis (much faster)
    #[arg(long)]
    pub no_synopsis: bool,

    /// Attempts for the series page fetch (1-10)
    #[arg(short = 'r', long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_retries: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 2)]
    pub retry_backoff: u64,

    /// Fetch synopses for at most this many episodes
    #[arg(long)]
    pub synopsis_limit: Option<usize>,

    /// Prefer episode ids embedded in thumbnail URLs over the reconstructed ones
    #[arg(long)]
    pub thumbnail_ids: bool,

    /// Text written when an episode has no synopsis
    #[arg(long, default_value = "あらすじなし")]
    pub synopsis_placeholder: String,

    /// Do not write the comment header at the top of the file
    #[arg(long)]
    pub no_header: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Default tracing level, overridden by RUST_LOG
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            retry_backoff: Duration::from_secs(self.retry_backoff),
            ..ClientConfig::default()
        }
    }

    pub fn scraper_config(&self) -> ScraperConfig {
        ScraperConfig {
            max_retries: self.max_retries,
            synopsis_limit: self.synopsis_limit,
            id_strategy: if self.thumbnail_ids {
                EpisodeIdStrategy::ThumbnailThenSeriesSlug
            } else {
                EpisodeIdStrategy::SeriesSlug
            },
            ..ScraperConfig::default()
        }
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            synopsis_placeholder: Some(self.synopsis_placeholder.clone()),
            header: !self.no_header,
        }
    }
}
