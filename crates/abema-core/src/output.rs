//! YAML rendering of a [`SeriesDocument`]
//!
//! Keys keep their declared order and Japanese text is written verbatim.

use serde::Serialize;

use crate::error::Result;
use crate::types::SeriesDocument;

/// Options for rendering the output file
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Text written in place of a missing synopsis; `None` writes `null`
    pub synopsis_placeholder: Option<String>,
    /// Prepend a comment header naming the series, source and date
    pub header: bool,
}

#[derive(Serialize)]
struct SeriesRecord<'a> {
    series_title: &'a str,
    source_url: &'a str,
    extraction_date: String,
    total_episodes: usize,
    episodes: Vec<EpisodeRecord<'a>>,
}

#[derive(Serialize)]
struct EpisodeRecord<'a> {
    episode_number: u32,
    title: &'a str,
    synopsis: Option<&'a str>,
    url: Option<&'a str>,
}

/// Renders the document as YAML
///
/// # Errors
/// Returns `Serialization` if the YAML emitter fails
pub fn render_yaml(document: &SeriesDocument, options: &OutputOptions) -> Result<String> {
    let placeholder = options.synopsis_placeholder.as_deref();

    let record = SeriesRecord {
        series_title: document.title(),
        source_url: document.source_url(),
        extraction_date: document.extraction_date().format("%Y-%m-%d").to_string(),
        total_episodes: document.total_episodes(),
        episodes: document
            .episodes()
            .iter()
            .map(|episode| EpisodeRecord {
                episode_number: episode.number,
                title: &episode.title,
                synopsis: episode.synopsis.as_deref().or(placeholder),
                url: episode.url.as_deref(),
            })
            .collect(),
    };

    let body = serde_yaml::to_string(&record)?;

    if !options.header {
        return Ok(body);
    }

    // Comment lines must not be broken by the title
    let header_title = document.title().replace(['\r', '\n'], " ");

    Ok(format!(
        "# {} - ABEMA エピソード情報\n# データソース: {}\n# 取得日: {}\n\n{}",
        header_title,
        document.source_url(),
        record.extraction_date,
        body
    ))
}
