// src/lambda/mod.rs

//! AWS Lambda handler for the watcher.
//!
//! Each invocation:
//! 1. Builds the configuration from defaults, an optional bundled file and the environment
//! 2. Loads the watermark from S3
//! 3. Fetches the board over HTTP and reconciles it
//! 4. Notifies new listings and writes the watermark back

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::{Config, FetchStrategy};
use crate::pipeline::{RunSummary, run_with_config};
use crate::storage::S3StateStore;

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct WatchRequest {
    /// Fetch strategy for this run (defaults to `http`)
    #[serde(default)]
    pub strategy: Option<FetchStrategy>,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct WatchResponse {
    /// Whether the run completed
    pub success: bool,

    /// Watermark transition (`empty`, `repair`, `advance`, `idle`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,

    /// Listings extracted from the board
    pub batch_size: usize,

    /// Listings above the previous watermark
    pub new_listings: usize,

    pub delivered: usize,
    pub failed: usize,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl From<RunSummary> for WatchResponse {
    fn from(summary: RunSummary) -> Self {
        Self {
            success: true,
            transition: Some(summary.transition.label().to_string()),
            batch_size: summary.batch_size,
            new_listings: summary.new_listings,
            delivered: summary.delivered,
            failed: summary.failed,
            error: None,
            execution_time_ms: 0,
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<WatchRequest>,
) -> std::result::Result<WatchResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting watch run: strategy={:?}", request.strategy);

    match run_watch(&request).await {
        Ok(summary) => {
            let mut response = WatchResponse::from(summary);
            response.execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Watch completed: {:?}, {} new, {} delivered in {}ms",
                response.transition,
                response.new_listings,
                response.delivered,
                response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Watch failed: {}", e);
            Ok(WatchResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

async fn run_watch(request: &WatchRequest) -> Result<RunSummary> {
    let config = load_lambda_config(request)?;
    let store = S3StateStore::from_env().await?;
    run_with_config(&config, &store).await
}

/// Load configuration suitable for the Lambda environment.
///
/// `WATCHER_CONFIG_PATH` points at a bundled TOML file; without it the
/// defaults apply. Environment overrides are applied last.
fn load_lambda_config(request: &WatchRequest) -> Result<Config> {
    let config = match std::env::var("WATCHER_CONFIG_PATH") {
        Ok(path) => Config::load(path)?,
        Err(_) => Config::default(),
    };
    let mut config = config.with_env_overrides()?;
    config.crawler.strategy = request.strategy.unwrap_or(FetchStrategy::Http);
    config.validate()?;
    Ok(config)
}
