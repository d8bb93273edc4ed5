//! Board page retrieval.
//!
//! Two strategies satisfy [`BoardFetcher`]: a headless-browser render
//! (`browser` feature) and a plain HTTP fetch with a cookie bootstrap.

use async_trait::async_trait;

use crate::error::Result;
#[cfg(not(feature = "browser"))]
use crate::error::AppError;
use crate::models::{Config, FetchStrategy};

#[cfg(feature = "browser")]
use super::BrowserFetcher;
use super::HttpFetcher;

/// Source of raw board markup.
#[async_trait]
pub trait BoardFetcher: Send + Sync {
    /// Retrieve the board page as markup.
    async fn fetch_board_markup(&self) -> Result<String>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the fetcher selected by `crawler.strategy`.
pub fn build_fetcher(config: &Config) -> Result<Box<dyn BoardFetcher>> {
    match config.crawler.strategy {
        FetchStrategy::Http => Ok(Box::new(HttpFetcher::new(&config.crawler, &config.board)?)),
        #[cfg(feature = "browser")]
        FetchStrategy::Browser => Ok(Box::new(BrowserFetcher::new(
            &config.crawler,
            &config.board,
        )?)),
        #[cfg(not(feature = "browser"))]
        FetchStrategy::Browser => Err(AppError::config(
            "browser strategy requires the `browser` feature; set FETCH_STRATEGY=http",
        )),
    }
}
