//! Hot-deal watcher CLI
//!
//! Local execution entry point. For AWS Lambda, use `hotdeal-watcher-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hotdeal_watcher::{
    error::Result,
    models::Config,
    pipeline,
    services::{ListingExtractor, build_fetcher},
    storage::{LocalStateStore, StateStore},
};

/// hotdeal-watcher - Deal board watcher with webhook alerts
#[derive(Parser, Debug)]
#[command(
    name = "hotdeal-watcher",
    version,
    about = "Watches a deal board and posts new listings to a webhook"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the board, notify new listings and save the watermark
    Run,

    /// Fetch and extract once, printing the batch as JSON
    Fetch,

    /// Show the stored watermark
    State,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (config, load_error) = Config::load_or_default(&cli.config);
    init_logging(cli.verbose, &config.logging.level);
    if let Some(e) = load_error {
        log::warn!(
            "Config load failed from {}: {e}. Using defaults.",
            cli.config.display()
        );
    }
    let config = config.with_env_overrides()?;

    log::info!("Hot-deal watcher starting...");
    let store = LocalStateStore::new(&config.state.path);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            config.validate()?;
            pipeline::run_with_config(&config, &store).await?;
        }

        Command::Fetch => {
            config.validate()?;
            let fetcher = build_fetcher(&config)?;
            let extractor = ListingExtractor::new(&config.selectors, &config.board.origin)?;
            let batch = pipeline::fetch_batch(&config, fetcher.as_ref(), &extractor).await?;
            println!("{}", serde_json::to_string_pretty(&batch)?);
            log::info!("Fetched {} listing(s)", batch.len());
        }

        Command::State => match store.load().await? {
            Some(watermark) => {
                log::info!("State file: {}", store.location());
                println!("{}", serde_json::to_string_pretty(&watermark)?);
            }
            None => log::info!("No state saved yet at {}", store.location()),
        },

        Command::Validate => {
            pipeline::run_validate(&cli.config)?;
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
