//! Service layer for the watcher.
//!
//! This module contains the I/O-facing steps of a run:
//! - Board retrieval (`BoardFetcher`, `BrowserFetcher`, `HttpFetcher`)
//! - Listing extraction (`ListingExtractor`)
//! - Webhook delivery (`ListingNotifier`, `WebhookNotifier`)

#[cfg(feature = "browser")]
mod browser_fetcher;
mod extractor;
mod fetcher;
mod http_fetcher;
mod notifier;

#[cfg(feature = "browser")]
pub use browser_fetcher::BrowserFetcher;
pub use extractor::{ListingExtractor, NodeError};
pub use fetcher::{BoardFetcher, build_fetcher};
pub use http_fetcher::HttpFetcher;
pub use notifier::{DispatchReport, ListingNotifier, WebhookNotifier};
