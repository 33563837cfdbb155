//! URL helper functions for abema.tv
//!
//! Provides origin checks, series slug extraction and episode identifier
//! reconstruction.

use url::Url;

use crate::error::{AbemaError, Result};

/// Origin of the streaming service
pub const BASE_URL: &str = "https://abema.tv";

const SERIES_MARKER: &str = "/title/";
const PROGRAM_MARKER: &str = "/programs/";

/// Parses `url` and checks that it belongs to the same origin as `base`
///
/// Scheme, host and port must all match. No network access happens here.
///
/// # Errors
/// Returns `InvalidUrl` when the URL does not parse or lies outside the origin
pub fn check_origin(url: &str, base: &Url) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| AbemaError::InvalidUrl(format!("{url}: {e}")))?;

    let same_origin = parsed.scheme() == base.scheme()
        && parsed.host_str() == base.host_str()
        && parsed.port_or_known_default() == base.port_or_known_default();

    if !same_origin {
        return Err(AbemaError::InvalidUrl(format!(
            "{url} is outside {}",
            base.origin().ascii_serialization()
        )));
    }

    Ok(parsed)
}

/// Returns true when the URL path points at a series page (`/video/title/<slug>`)
///
/// # Example
/// ```
/// use abema_core::url::is_series_path;
/// assert!(is_series_path("https://abema.tv/video/title/26-249"));
/// assert!(!is_series_path("https://abema.tv/video/episode/26-249_s1_p1"));
/// ```
pub fn is_series_path(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.path().starts_with("/video/title/"))
        .unwrap_or(false)
        && extract_series_slug(url).is_some()
}

/// Extracts the series slug, the path segment following `/title/`
///
/// # Example
/// ```
/// use abema_core::url::extract_series_slug;
/// let slug = extract_series_slug("https://abema.tv/video/title/26-249");
/// assert_eq!(slug, Some("26-249".to_string()));
/// ```
pub fn extract_series_slug(series_url: &str) -> Option<String> {
    let start = series_url.find(SERIES_MARKER)? + SERIES_MARKER.len();
    let rest = &series_url[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let slug = &rest[..end];

    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// Composes the heuristic episode identifier `<slug>_s1_p<number>`
///
/// The series page never exposes per-episode identifiers; this reproduces the
/// shape used by single-season titles.
pub fn build_episode_id(slug: &str, episode_number: u32) -> String {
    format!("{}_s1_p{}", slug, episode_number)
}

/// Derives an episode identifier from the series URL, if a slug is present
///
/// # Example
/// ```
/// use abema_core::url::derive_episode_id;
/// let id = derive_episode_id("https://abema.tv/video/title/test-series", 1);
/// assert_eq!(id, Some("test-series_s1_p1".to_string()));
/// assert_eq!(derive_episode_id("https://invalid.url", 1), None);
/// ```
pub fn derive_episode_id(series_url: &str, episode_number: u32) -> Option<String> {
    extract_series_slug(series_url).map(|slug| build_episode_id(&slug, episode_number))
}

/// Extracts the program identifier embedded in a thumbnail URL
///
/// Thumbnails are served from `.../programs/<id>/<file>`; the segment must be
/// followed by another path component.
pub fn extract_program_id(thumbnail_url: &str) -> Option<String> {
    let start = thumbnail_url.find(PROGRAM_MARKER)? + PROGRAM_MARKER.len();
    let rest = &thumbnail_url[start..];
    let end = rest.find('/')?;
    let id = &rest[..end];

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Builds the canonical episode page URL from an identifier
///
/// # Example
/// ```
/// use abema_core::url::build_episode_url;
/// let url = build_episode_url("26-249_s1_p3");
/// assert_eq!(url, "https://abema.tv/video/episode/26-249_s1_p3");
/// ```
pub fn build_episode_url(episode_id: &str) -> String {
    format!("{}/video/episode/{}", BASE_URL, episode_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(BASE_URL).unwrap()
    }

    #[test]
    fn test_check_origin_accepts_service_url() {
        let url = check_origin("https://abema.tv/video/title/26-249", &base());
        assert!(url.is_ok());
    }

    #[test]
    fn test_check_origin_rejects_other_host() {
        let result = check_origin("https://example.com/video/title/26-249", &base());
        assert!(matches!(result, Err(AbemaError::InvalidUrl(_))));
    }

    #[test]
    fn test_check_origin_rejects_plain_http() {
        let result = check_origin("http://abema.tv/video/title/26-249", &base());
        assert!(matches!(result, Err(AbemaError::InvalidUrl(_))));
    }

    #[test]
    fn test_check_origin_rejects_garbage() {
        let result = check_origin("not a url", &base());
        assert!(matches!(result, Err(AbemaError::InvalidUrl(_))));
    }

    #[test]
    fn test_check_origin_respects_port() {
        let local = Url::parse("http://127.0.0.1:8080").unwrap();
        assert!(check_origin("http://127.0.0.1:8080/video/title/x", &local).is_ok());
        assert!(check_origin("http://127.0.0.1:9090/video/title/x", &local).is_err());
    }

    #[test]
    fn test_extract_series_slug() {
        assert_eq!(
            extract_series_slug("https://abema.tv/video/title/189-85"),
            Some("189-85".to_string())
        );
        assert_eq!(
            extract_series_slug("https://abema.tv/video/title/189-85/"),
            Some("189-85".to_string())
        );
        assert_eq!(
            extract_series_slug("https://abema.tv/video/title/189-85?s=189-85_s1"),
            Some("189-85".to_string())
        );
    }

    #[test]
    fn test_extract_series_slug_missing() {
        assert_eq!(extract_series_slug("https://invalid.url"), None);
        assert_eq!(extract_series_slug("https://abema.tv/video/title/"), None);
    }

    #[test]
    fn test_derive_episode_id() {
        assert_eq!(
            derive_episode_id(".../title/test-series", 1),
            Some("test-series_s1_p1".to_string())
        );
        assert_eq!(derive_episode_id("https://invalid.url", 1), None);
    }

    #[test]
    fn test_extract_program_id() {
        assert_eq!(
            extract_program_id("https://image.p-c2-x.abema-tv.com/image/programs/26-249_s1_p7/thumb001.png"),
            Some("26-249_s1_p7".to_string())
        );
        // No trailing component after the id
        assert_eq!(extract_program_id("https://abema.tv/video/programs/test-1"), None);
        assert_eq!(extract_program_id(""), None);
    }

    #[test]
    fn test_is_series_path() {
        assert!(is_series_path("https://abema.tv/video/title/26-249"));
        assert!(!is_series_path("https://abema.tv/video/title/"));
        assert!(!is_series_path("https://abema.tv/now-on-air/abema-anime"));
        assert!(!is_series_path("garbage"));
    }
}
