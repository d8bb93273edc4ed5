// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load, override and validate the configuration, logging the effective values.
pub fn run_validate(config_path: &Path) -> Result<Config> {
    log::info!("Validating configuration at {}", config_path.display());

    let result = Config::load(config_path)
        .and_then(Config::with_env_overrides)
        .and_then(|config| config.validate().map(|()| config));

    match result {
        Ok(config) => {
            log::info!("Configuration is valid");
            log::info!("  user agent: {}", config.crawler.user_agent);
            log::info!("  strategy: {:?}", config.crawler.strategy);
            log::info!(
                "  timeout: {}s, retries: {}",
                config.crawler.timeout_secs,
                config.crawler.max_retries
            );
            log::info!("  board: {}", config.board.board_url()?);
            log::info!(
                "  webhook: {}",
                if config.notifier.webhook_url.is_some() {
                    "configured"
                } else {
                    "not set"
                }
            );
            log::info!("  state: {}", config.state.path);
            Ok(config)
        }
        Err(e) => {
            log::error!("Configuration is invalid: {e}");
            Err(e)
        }
    }
}
