// src/services/http_fetcher.rs

//! Plain HTTP board fetch with a two-step cookie bootstrap.
//!
//! 1. GET the site root to collect clearance cookies from `Set-Cookie`.
//! 2. GET the board with those cookies and the root as referer.
//!
//! No status code fails at the transport layer; a non-200 board response is
//! turned into [`AppError::UpstreamStatus`] with a body snippet.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{COOKIE, REFERER};
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::{BoardConfig, CrawlerConfig};
use crate::services::BoardFetcher;
use crate::utils::http::{
    browser_headers, create_async_client, extract_cookies, header_value, snippet,
};
use crate::utils::url::get_domain;

/// Characters of an error body kept for diagnostics.
const SNIPPET_CHARS: usize = 1000;

/// Fallback fetcher that imitates a browser navigation over HTTP.
pub struct HttpFetcher {
    client: Client,
    accept_language: String,
    cookie_settle: Duration,
    main_url: String,
    board_url: String,
    referer: String,
}

impl HttpFetcher {
    pub fn new(crawler: &CrawlerConfig, board: &BoardConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(crawler)?,
            accept_language: crawler.accept_language.clone(),
            cookie_settle: Duration::from_millis(crawler.cookie_settle_ms),
            main_url: board.main_url()?,
            board_url: board.board_url()?,
            referer: board.referer.clone(),
        })
    }

    /// Visit the site root and return its cookies as a `Cookie` value.
    async fn bootstrap_cookies(&self) -> Result<String> {
        log::info!("Step 1: visiting {} for clearance cookies", self.main_url);
        let response = self
            .client
            .get(&self.main_url)
            .headers(browser_headers(&self.accept_language)?)
            .header(REFERER, header_value(&self.referer)?)
            .send()
            .await
            .map_err(|e| AppError::fetch(&self.main_url, e))?;

        log::info!("Main page responded with {}", response.status());
        let cookies = extract_cookies(response.headers());
        log::debug!(
            "Collected {} cookie(s) from {}",
            cookies.split("; ").filter(|c| !c.is_empty()).count(),
            get_domain(&self.main_url).unwrap_or_default()
        );
        Ok(cookies)
    }
}

#[async_trait]
impl BoardFetcher for HttpFetcher {
    async fn fetch_board_markup(&self) -> Result<String> {
        let cookies = self.bootstrap_cookies().await?;

        if !self.cookie_settle.is_zero() {
            tokio::time::sleep(self.cookie_settle).await;
        }

        log::info!("Step 2: fetching board {}", self.board_url);
        let mut request = self
            .client
            .get(&self.board_url)
            .headers(browser_headers(&self.accept_language)?)
            .header(REFERER, header_value(&self.main_url)?);
        if !cookies.is_empty() {
            request = request.header(COOKIE, header_value(&cookies)?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::fetch(&self.board_url, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::fetch(&self.board_url, e))?;

        if status != StatusCode::OK {
            let snippet = snippet(&body, SNIPPET_CHARS);
            log::error!("Board responded with {status}: {snippet}");
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                snippet,
            });
        }

        log::info!("Board responded with {status} ({} bytes)", body.len());
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
