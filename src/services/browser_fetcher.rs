// src/services/browser_fetcher.rs

//! Headless-browser board fetch.
//!
//! The board runs a script challenge that plain HTTP clients fail, so the
//! primary path renders the page in Chromium and reads the final DOM.
//! A browser is launched per fetch and torn down on every exit path.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;

use crate::error::{AppError, Result};
use crate::models::{BoardConfig, CrawlerConfig};
use crate::services::BoardFetcher;
use crate::utils::http::DOCUMENT_ACCEPT;

/// Primary fetcher rendering the board in headless Chromium.
pub struct BrowserFetcher {
    config: CrawlerConfig,
    board_url: String,
}

impl BrowserFetcher {
    pub fn new(crawler: &CrawlerConfig, board: &BoardConfig) -> Result<Self> {
        Ok(Self {
            config: crawler.clone(),
            board_url: board.board_url()?,
        })
    }

    fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Page emulation; the window size alone leaves pages at 800x600.
    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.config.viewport_width,
            height: self.config.viewport_height,
            ..Viewport::default()
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .viewport(self.viewport())
            .request_timeout(self.page_timeout())
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-accelerated-2d-canvas")
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", self.config.user_agent))
            .arg(format!("--lang={}", primary_language(&self.config.accept_language)));

        if let Some(ref chrome_path) = self.config.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        builder
            .build()
            .map_err(|e| AppError::fetch("browser config", e))
    }

    /// Load the board in a fresh tab and return the rendered document.
    async fn render(&self, browser: &Browser) -> Result<String> {
        let browser_err = |e: chromiumoxide::error::CdpError| AppError::fetch(&self.board_url, e);

        let page = browser.new_page("about:blank").await.map_err(browser_err)?;

        let headers = Headers::new(serde_json::json!({
            "Accept": DOCUMENT_ACCEPT,
            "Accept-Language": self.config.accept_language,
        }));
        page.execute(SetExtraHttpHeadersParams::new(headers))
            .await
            .map_err(browser_err)?;

        log::info!("Loading {} in headless browser", self.board_url);
        tokio::time::timeout(self.page_timeout(), page.goto(&self.board_url))
            .await
            .map_err(|_| {
                AppError::fetch(
                    &self.board_url,
                    format!("page load exceeded {}s", self.config.timeout_secs),
                )
            })?
            .map_err(browser_err)?;

        // Client-side rendering keeps going after the load event
        tokio::time::sleep(Duration::from_millis(self.config.render_settle_ms)).await;

        let html = page.content().await.map_err(browser_err)?;
        if let Err(e) = page.close().await {
            log::debug!("Failed to close page: {e}");
        }
        log::info!("Rendered board markup ({} bytes)", html.len());
        Ok(html)
    }
}

#[async_trait]
impl BoardFetcher for BrowserFetcher {
    async fn fetch_board_markup(&self) -> Result<String> {
        log::info!("Launching headless browser");
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| AppError::fetch("browser launch", e))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::debug!("Browser handler error: {e}");
                }
            }
        });

        let result = self.render(&browser).await;

        if let Err(e) = browser.close().await {
            log::warn!("Failed to close browser: {e}");
        }
        if let Err(e) = browser.wait().await {
            log::warn!("Failed to reap browser process: {e}");
        }
        handler_task.abort();

        result
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

/// First tag of an `Accept-Language` value (`ko-KR,ko;q=0.9` → `ko-KR`).
fn primary_language(accept_language: &str) -> &str {
    accept_language
        .split([',', ';'])
        .next()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .unwrap_or("en-US")
}
