//! Series title resolution from the breadcrumb block

use super::blocks::{Block, scan_blocks};

/// Returned when no breadcrumb names the series
pub const UNKNOWN_SERIES_TITLE: &str = "不明なシリーズ";

/// Generic navigation labels that never name a series
const GENERIC_LABELS: &[&str] = &[
    "ホーム",
    "アニメ",
    "ドラマ",
    "映画",
    "バラエティ",
    "詳細",
    "Home",
    "Anime",
    "Drama",
    "Details",
];

/// Names must be longer than this many characters
const MIN_TITLE_CHARS: usize = 3;

/// Resolves the series display name from the page's breadcrumb trail
///
/// Walks every `BreadcrumbList` block in page order and returns the first
/// `name` that is not a generic label and is long enough to be a title.
/// Never fails; returns [`UNKNOWN_SERIES_TITLE`] when nothing qualifies.
pub fn resolve_title(html: &str) -> String {
    scan_blocks(html)
        .map(Block::parse)
        .filter(|block| block.has_type("BreadcrumbList"))
        .find_map(|block| {
            block
                .all_strings("name")
                .iter()
                .map(|name| name.trim())
                .find(|name| is_series_name(name))
                .map(str::to_string)
        })
        .unwrap_or_else(|| UNKNOWN_SERIES_TITLE.to_string())
}

fn is_series_name(name: &str) -> bool {
    let name = name.trim();
    !GENERIC_LABELS.contains(&name) && name.chars().count() > MIN_TITLE_CHARS
}
