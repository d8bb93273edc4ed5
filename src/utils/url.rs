// src/utils/url.rs

//! URL manipulation utilities.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// # Examples
/// ```
/// use hotdeal_watcher::utils::url::resolve;
///
/// assert_eq!(
///     resolve("https://www.fmkorea.com", "/9361540085"),
///     Some("https://www.fmkorea.com/9361540085".to_string())
/// );
/// ```
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    // Protocol-relative links always go over https
    if let Some(rest) = href.strip_prefix("//") {
        return Url::parse(&format!("https://{rest}"))
            .ok()
            .map(|u| u.to_string());
    }
    Url::parse(base)
        .and_then(|b| b.join(href))
        .ok()
        .map(|u| u.to_string())
}

/// Normalize a thumbnail `src` into an absolute URL.
///
/// Protocol-relative (`//cdn…`) and root-relative (`/files/…`) forms are
/// resolved; empty input yields `None`.
pub fn normalize_thumbnail(origin: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    resolve(origin, raw)
}

fn listing_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/(\d+)").ok()).as_ref()
}

/// Extract the listing number from the first numeric path segment.
///
/// Returns `None` when no digits follow a slash, when the number does not
/// fit a `u64`, or when it is zero.
pub fn extract_listing_id(url: &str) -> Option<u64> {
    let parsed = Url::parse(url).ok()?;
    let caps = listing_id_pattern()?.captures(parsed.path())?;
    caps.get(1)?
        .as_str()
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
}

/// Extract the host from a URL string.
pub fn get_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.fmkorea.com";

    #[test]
    fn test_resolve_absolute_url() {
        assert_eq!(
            resolve(ORIGIN, "https://other.com/page"),
            Some("https://other.com/page".to_string())
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(
            resolve(ORIGIN, "/9361540085"),
            Some("https://www.fmkorea.com/9361540085".to_string())
        );
    }

    #[test]
    fn test_resolve_empty_href() {
        assert_eq!(resolve(ORIGIN, "   "), None);
    }

    #[test]
    fn test_normalize_protocol_relative_thumbnail() {
        assert_eq!(
            normalize_thumbnail(ORIGIN, "//cdn.example.com/x.jpg"),
            Some("https://cdn.example.com/x.jpg".to_string())
        );
    }

    #[test]
    fn test_normalize_root_relative_thumbnail() {
        assert_eq!(
            normalize_thumbnail(ORIGIN, "/files/thumbnails/1.jpg"),
            Some("https://www.fmkorea.com/files/thumbnails/1.jpg".to_string())
        );
    }

    #[test]
    fn test_normalize_keeps_absolute_thumbnail() {
        assert_eq!(
            normalize_thumbnail(ORIGIN, "http://image.fmkorea.com/a.png"),
            Some("http://image.fmkorea.com/a.png".to_string())
        );
        assert_eq!(normalize_thumbnail(ORIGIN, ""), None);
    }

    #[test]
    fn test_extract_listing_id_path_digits() {
        assert_eq!(
            extract_listing_id("https://www.fmkorea.com/9361540085"),
            Some(9_361_540_085)
        );
        assert_eq!(
            extract_listing_id("https://www.fmkorea.com/hotdeal/123?page=2"),
            Some(123)
        );
        assert_eq!(
            extract_listing_id("https://www.fmkorea.com/123/comment"),
            Some(123)
        );
    }

    #[test]
    fn test_extract_listing_id_ignores_query_digits() {
        assert_eq!(
            extract_listing_id("https://www.fmkorea.com/index.php?document_srl=77"),
            None
        );
    }

    #[test]
    fn test_extract_listing_id_rejects_zero_and_overflow() {
        assert_eq!(extract_listing_id("https://www.fmkorea.com/0"), None);
        assert_eq!(
            extract_listing_id("https://www.fmkorea.com/99999999999999999999999"),
            None
        );
    }

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("https://WWW.fmkorea.com/hotdeal"),
            Some("www.fmkorea.com".to_string())
        );
        assert_eq!(get_domain("invalid-url"), None);
    }
}
