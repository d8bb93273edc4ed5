// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue, SET_COOKIE,
    UPGRADE_INSECURE_REQUESTS,
};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Accept header sent by desktop Chrome for documents.
pub const DOCUMENT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
image/avif,image/webp,image/apng,*/*;q=0.8";

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Headers that make a plain request look like a browser navigation.
pub fn browser_headers(accept_language: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(DOCUMENT_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, header_value(accept_language)?);
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    for (name, value) in [
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "same-origin"),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    Ok(headers)
}

/// Build a header value, reporting invalid characters as a config error.
pub fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::config(format!("invalid header value '{value}': {e}")))
}

/// Collapse `Set-Cookie` headers into a `Cookie` request value.
///
/// Only the leading `name=value` pair of each header is kept; attributes such
/// as `path` or `expires` are dropped. Pairs are joined with `; `.
pub fn extract_cookies(headers: &HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            let (name, value) = pair.split_once('=')?;
            (!name.trim().is_empty() && !value.is_empty()).then(|| pair.to_string())
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Truncate a response body for logging, respecting char boundaries.
pub fn snippet(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_cookies(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(SET_COOKIE, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_extract_cookies_keeps_name_value_pairs() {
        let headers = set_cookies(&[
            "cf_clearance=abc123; path=/; domain=.fmkorea.com; HttpOnly",
            "PHPSESSID=xyz; path=/",
        ]);
        assert_eq!(extract_cookies(&headers), "cf_clearance=abc123; PHPSESSID=xyz");
    }

    #[test]
    fn test_extract_cookies_skips_malformed() {
        let headers = set_cookies(&["no-equals-sign", "empty=; path=/", "ok=1"]);
        assert_eq!(extract_cookies(&headers), "ok=1");
    }

    #[test]
    fn test_extract_cookies_without_headers() {
        assert_eq!(extract_cookies(&HeaderMap::new()), "");
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        assert_eq!(snippet("핫딜게시판", 2), "핫딜…");
        assert_eq!(snippet("short", 100), "short");
    }

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers("ko-KR,ko;q=0.9").unwrap();
        assert_eq!(headers[ACCEPT_LANGUAGE], "ko-KR,ko;q=0.9");
        assert_eq!(headers["sec-fetch-mode"], "navigate");
    }

    #[test]
    fn test_create_async_client() {
        assert!(create_async_client(&CrawlerConfig::default()).is_ok());
    }
}
