//! Episode list parser for series pages
//!
//! Episodes are recovered from the thumbnail captions of `ImageObject`
//! blocks ("<series> 第N話 <subtitle>のサムネイル").

use std::sync::LazyLock;

use regex::Regex;

use super::blocks::{Block, scan_blocks};
use crate::types::Episode;
use crate::url::{build_episode_url, derive_episode_id, extract_program_id};

const EPISODE_MARKER: char = '第';
const COUNTER_MARKER: char = '話';

static CAPTION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"第([0-9０-９]+)話\s*(.+?)(?:のサムネイル)?$").ok());

/// How an episode identifier is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeIdStrategy {
    /// Always `<series slug>_s1_p<number>`
    #[default]
    SeriesSlug,
    /// The program id from the thumbnail URL when present, the slug
    /// heuristic otherwise
    ThumbnailThenSeriesSlug,
}

impl EpisodeIdStrategy {
    /// Derives the identifier for one episode, `None` when nothing fits
    pub fn derive(&self, series_url: &str, thumbnail_url: &str, episode_number: u32) -> Option<String> {
        match self {
            EpisodeIdStrategy::SeriesSlug => derive_episode_id(series_url, episode_number),
            EpisodeIdStrategy::ThumbnailThenSeriesSlug => extract_program_id(thumbnail_url)
                .or_else(|| derive_episode_id(series_url, episode_number)),
        }
    }
}

/// Parses the episode list of a series page with the default strategy
///
/// # Arguments
/// * `html` - Raw HTML of the series page
/// * `series_url` - URL the page was fetched from, used to derive identifiers
///
/// # Returns
/// Episodes sorted ascending by number. Blocks that do not look like episode
/// captions are skipped, so this never fails.
pub fn parse_episodes(html: &str, series_url: &str) -> Vec<Episode> {
    parse_episodes_with(html, series_url, EpisodeIdStrategy::default())
}

/// Parses the episode list using an explicit identifier strategy
pub fn parse_episodes_with(html: &str, series_url: &str, strategy: EpisodeIdStrategy) -> Vec<Episode> {
    let mut episodes: Vec<Episode> = scan_blocks(html)
        .filter_map(|raw| parse_episode_block(&Block::parse(raw), series_url, strategy))
        .collect();

    // Stable: duplicates keep page order
    episodes.sort_by_key(|episode| episode.number);
    episodes
}

fn parse_episode_block(block: &Block<'_>, series_url: &str, strategy: EpisodeIdStrategy) -> Option<Episode> {
    if !block.has_field("caption") {
        return None;
    }

    let caption = block.first_string("caption")?;
    let (number, title) = parse_caption(&caption)?;

    let thumbnail_url = block.first_string("url").unwrap_or_default();
    let url = strategy
        .derive(series_url, &thumbnail_url, number)
        .map(|id| build_episode_url(&id));

    Some(Episode {
        number,
        title,
        synopsis: None,
        url,
        thumbnail_url: (!thumbnail_url.is_empty()).then_some(thumbnail_url),
    })
}

/// Splits a caption into episode number and subtitle
///
/// The trailing "のサムネイル" is dropped and the subtitle trimmed. Returns
/// `None` when the caption is not an episode caption or the number is zero.
pub fn parse_caption(caption: &str) -> Option<(u32, String)> {
    if !caption.contains(EPISODE_MARKER) || !caption.contains(COUNTER_MARKER) {
        return None;
    }

    let caps = CAPTION_PATTERN.as_ref()?.captures(caption.trim())?;
    let number = parse_episode_number(caps.get(1)?.as_str()).filter(|n| *n > 0)?;
    let title = caps.get(2)?.as_str().trim().to_string();

    if title.is_empty() {
        return None;
    }

    Some((number, title))
}

/// Parses ASCII or full-width digits, `None` on overflow
fn parse_episode_number(digits: &str) -> Option<u32> {
    digits.chars().try_fold(0u32, |acc, c| {
        let digit = match c {
            '０'..='９' => c as u32 - '０' as u32,
            _ => c.to_digit(10)?,
        };
        acc.checked_mul(10)?.checked_add(digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SERIES_URL: &str = "https://abema.tv/video/title/test-series";

    fn caption_block(caption: &str, url: &str) -> String {
        format!(
            r#"<script type="application/ld+json">{{"@context":"https://schema.org","@type":"ImageObject","caption":"{}","url":"{}"}}</script>"#,
            caption, url
        )
    }

    #[test]
    fn test_parse_caption_strips_thumbnail_suffix() {
        assert_eq!(
            parse_caption("Series 第1話 はじめての冒険のサムネイル"),
            Some((1, "はじめての冒険".to_string()))
        );
    }

    #[test]
    fn test_parse_caption_without_suffix() {
        assert_eq!(
            parse_caption("Series 第2話 新しい出会い"),
            Some((2, "新しい出会い".to_string()))
        );
    }

    #[test]
    fn test_parse_caption_full_width_digits() {
        assert_eq!(parse_caption("Series 第１話 はじめて"), Some((1, "はじめて".to_string())));
        assert_eq!(
            parse_caption("Series 第１２話 最終回のサムネイル"),
            Some((12, "最終回".to_string()))
        );
        assert_eq!(parse_caption("Series 第０話 ゼロ"), None);
    }

    #[test]
    fn test_parse_episode_number_overflow() {
        assert_eq!(parse_episode_number("4294967295"), Some(u32::MAX));
        assert_eq!(parse_episode_number("4294967296"), None);
    }

    #[test]
    fn test_parse_caption_rejects_non_episode_captions() {
        assert_eq!(parse_caption("番組のサムネイル"), None);
        assert_eq!(parse_caption("第話 数字なし"), None);
        assert_eq!(parse_caption("Series 第0話 ゼロ"), None);
        assert_eq!(parse_caption("Series 第3話"), None);
    }

    #[test]
    fn test_parse_episodes_from_fixture() {
        let html = format!(
            "{}{}",
            caption_block("テストシリーズ 第1話 はじめての冒険のサムネイル", "https://abema.tv/video/programs/test-1"),
            caption_block("テストシリーズ 第2話 新しい出会い", "https://abema.tv/video/programs/test-2"),
        );

        let episodes = parse_episodes(&html, SERIES_URL);
        assert_eq!(episodes.len(), 2);

        assert_eq!(episodes[0].number, 1);
        assert_eq!(episodes[0].title, "はじめての冒険");
        assert_eq!(
            episodes[0].url.as_deref(),
            Some("https://abema.tv/video/episode/test-series_s1_p1")
        );
        assert_eq!(
            episodes[0].thumbnail_url.as_deref(),
            Some("https://abema.tv/video/programs/test-1")
        );
        assert_eq!(episodes[0].synopsis, None);

        assert_eq!(episodes[1].number, 2);
        assert_eq!(episodes[1].title, "新しい出会い");
    }

    #[test]
    fn test_parse_episodes_sorts_by_number() {
        let html = format!(
            "{}{}{}",
            caption_block("S 第3話 三", ""),
            caption_block("S 第1話 一", ""),
            caption_block("S 第2話 二", ""),
        );

        let numbers: Vec<u32> = parse_episodes(&html, SERIES_URL).iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_episodes_keeps_duplicates_in_page_order() {
        let html = format!(
            "{}{}",
            caption_block("S 第1話 最初", ""),
            caption_block("S 第1話 重複", ""),
        );

        let episodes = parse_episodes(&html, SERIES_URL);
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].title, "最初");
        assert_eq!(episodes[1].title, "重複");
    }

    #[test]
    fn test_parse_episodes_without_slug_has_no_url() {
        let html = caption_block("S 第1話 タイトル", "");
        let episodes = parse_episodes(&html, "https://invalid.url");
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].url, None);
        assert_eq!(episodes[0].thumbnail_url, None);
    }

    #[test]
    fn test_parse_episodes_skips_unrelated_blocks() {
        let html = format!(
            r#"<script type="application/ld+json">{{"@type":"BreadcrumbList","name":"ホーム"}}</script>
            <script type="application/ld+json">{{"@type":"ImageObject","caption":"番組ロゴ"}}</script>
            {}"#,
            caption_block("S 第5話 本編", "")
        );

        let episodes = parse_episodes(&html, SERIES_URL);
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].number, 5);
    }

    #[test]
    fn test_thumbnail_strategy_prefers_program_id() {
        let html = caption_block(
            "S 第7話 七",
            "https://image.p-c2-x.abema-tv.com/image/programs/26-249_s1_p7/thumb001.png",
        );

        let episodes = parse_episodes_with(&html, SERIES_URL, EpisodeIdStrategy::ThumbnailThenSeriesSlug);
        assert_eq!(
            episodes[0].url.as_deref(),
            Some("https://abema.tv/video/episode/26-249_s1_p7")
        );

        let episodes = parse_episodes(&html, SERIES_URL);
        assert_eq!(
            episodes[0].url.as_deref(),
            Some("https://abema.tv/video/episode/test-series_s1_p7")
        );
    }

    #[test]
    fn test_thumbnail_strategy_falls_back_to_slug() {
        let id = EpisodeIdStrategy::ThumbnailThenSeriesSlug.derive(SERIES_URL, "", 4);
        assert_eq!(id, Some("test-series_s1_p4".to_string()));
    }

    proptest! {
        #[test]
        fn prop_parse_episodes_always_sorted(numbers in proptest::collection::vec(1u32..500, 0..20)) {
            let html: String = numbers
                .iter()
                .map(|n| caption_block(&format!("S 第{}話 タイトル{}", n, n), ""))
                .collect();

            let parsed: Vec<u32> = parse_episodes(&html, SERIES_URL).iter().map(|e| e.number).collect();
            let mut expected = numbers.clone();
            expected.sort();
            prop_assert_eq!(parsed, expected);
        }
    }
}
