// src/pipeline/watch.rs

//! Watch pipeline: fetch, extract, reconcile, notify, persist.

use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Batch, Config, Watermark};
use crate::pipeline::reconcile::{Transition, reconcile};
use crate::pipeline::retry::RetryPolicy;
use crate::services::{
    BoardFetcher, DispatchReport, ListingExtractor, ListingNotifier, WebhookNotifier,
    build_fetcher,
};
use crate::storage::StateStore;
use crate::utils::http::create_async_client;

/// Summary of one watch run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub transition: Transition,
    pub batch_size: usize,
    pub previous_id: u64,
    pub watermark_id: u64,
    pub new_listings: usize,
    pub delivered: usize,
    pub failed: usize,
    pub notify_skipped: bool,
    pub persisted: bool,
}

/// Fetch the board and extract its listings, retrying the pair as a unit.
pub async fn fetch_batch(
    config: &Config,
    fetcher: &dyn BoardFetcher,
    extractor: &ListingExtractor,
) -> Result<Batch> {
    let policy = RetryPolicy::from_config(&config.crawler);
    policy
        .run("Board fetch", |attempt| async move {
            log::info!("Fetching board via {} (attempt {attempt})", fetcher.name());
            let markup = fetcher.fetch_board_markup().await?;
            extractor.extract(&markup)
        })
        .await
}

/// Load the watermark; an unreadable store counts as no watermark.
async fn load_watermark(store: &dyn StateStore) -> Watermark {
    match store.load().await {
        Ok(Some(watermark)) => {
            log::info!(
                "Loaded watermark {} from {}",
                watermark.last_seen_id,
                store.location()
            );
            watermark
        }
        Ok(None) => Watermark::default(),
        Err(e) => {
            log::warn!("Failed to load state from {}: {e}; starting from 0", store.location());
            Watermark::default()
        }
    }
}

/// Run the watcher with explicit collaborators.
pub async fn run_watcher(
    config: &Config,
    fetcher: &dyn BoardFetcher,
    store: &dyn StateStore,
    notifier: &dyn ListingNotifier,
) -> Result<RunSummary> {
    let extractor = ListingExtractor::new(&config.selectors, &config.board.origin)?;

    let previous = load_watermark(store).await;
    let batch = fetch_batch(config, fetcher, &extractor).await?;

    let reconciliation = reconcile(&batch, &previous, Utc::now());
    let mut dispatch = DispatchReport::default();

    match reconciliation.transition {
        Transition::Empty => log::warn!("No listings extracted; nothing to do"),
        Transition::Idle => log::info!("No new listings above {}", previous.last_seen_id),
        Transition::Repair { from, to } => {
            log::warn!("Stored watermark {from} is ahead of board maximum {to}; repairing")
        }
        Transition::Advance { from, to } => {
            log::info!(
                "Found {} new listing(s) ({from} -> {to})",
                reconciliation.new_listings.len()
            );
            dispatch = notifier.notify_all(&reconciliation.new_listings).await;
        }
    }

    let persisted = reconciliation.needs_write();
    if persisted {
        store.save(&reconciliation.watermark).await?;
    }

    Ok(RunSummary {
        transition: reconciliation.transition,
        batch_size: batch.len(),
        previous_id: previous.last_seen_id,
        watermark_id: reconciliation.watermark.last_seen_id,
        new_listings: reconciliation.new_listings.len(),
        delivered: dispatch.delivered.len(),
        failed: dispatch.failed.len(),
        notify_skipped: dispatch.skipped,
        persisted,
    })
}

/// Run the watcher with the fetcher and notifier named by `config`.
pub async fn run_with_config(config: &Config, store: &dyn StateStore) -> Result<RunSummary> {
    let fetcher = build_fetcher(config)?;
    let notifier = WebhookNotifier::new(create_async_client(&config.crawler)?, &config.notifier);
    if !notifier.is_enabled() {
        log::warn!("Webhook URL not set; new listings will only be logged");
    }

    let summary = run_watcher(config, fetcher.as_ref(), store, &notifier).await?;
    log::info!(
        "Run complete: {} (batch {}, watermark {} -> {}, {} delivered, {} failed)",
        summary.transition.label(),
        summary.batch_size,
        summary.previous_id,
        summary.watermark_id,
        summary.delivered,
        summary.failed
    );
    Ok(summary)
}
