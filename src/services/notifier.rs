// src/services/notifier.rs

//! Webhook delivery of new listings.
//!
//! Listings are posted one at a time in the order given, with a fixed pause
//! between calls. A failed delivery is logged and recorded; it never stops
//! the remaining sends.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{DealMessage, Listing, NotifierConfig};
use crate::utils::http::snippet;

/// Outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listing ids the webhook accepted, in send order
    pub delivered: Vec<u64>,
    /// Listing ids whose delivery failed
    pub failed: Vec<u64>,
    /// No destination was configured
    pub skipped: bool,
}

impl DispatchReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Sink for new listings.
#[async_trait]
pub trait ListingNotifier: Send + Sync {
    /// Deliver every listing in order. Never fails as a whole.
    async fn notify_all(&self, listings: &[Listing]) -> DispatchReport;
}

/// Posts listings to an incoming-webhook URL.
pub struct WebhookNotifier {
    client: Client,
    config: NotifierConfig,
}

impl WebhookNotifier {
    pub fn new(client: Client, config: &NotifierConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url().is_some()
    }

    fn webhook_url(&self) -> Option<&str> {
        self.config
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Deliver one listing.
    pub async fn notify(&self, webhook_url: &str, listing: &Listing) -> Result<()> {
        let message = DealMessage::for_listing(listing, &self.config, Utc::now().timestamp())?;

        let response = self
            .client
            .post(webhook_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| AppError::notify(listing.id, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify(
                listing.id,
                format!("webhook returned {status}: {}", snippet(&body, 200)),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl ListingNotifier for WebhookNotifier {
    async fn notify_all(&self, listings: &[Listing]) -> DispatchReport {
        let Some(webhook_url) = self.webhook_url() else {
            log::warn!(
                "No webhook configured; skipping {} notification(s)",
                listings.len()
            );
            return DispatchReport::skipped();
        };

        let delay = Duration::from_millis(self.config.delay_ms);
        let mut report = DispatchReport::default();

        for (i, listing) in listings.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.notify(webhook_url, listing).await {
                Ok(()) => {
                    log::info!("Notified listing {}: {}", listing.id, listing.title);
                    report.delivered.push(listing.id);
                }
                Err(e) => {
                    log::error!("Failed to notify listing {}: {e}", listing.id);
                    report.failed.push(listing.id);
                }
            }
        }

        log::info!(
            "Dispatch finished: {} delivered, {} failed",
            report.delivered.len(),
            report.failed.len()
        );
        report
    }
}
