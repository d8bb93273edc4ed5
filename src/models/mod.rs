// src/models/mod.rs

//! Domain models for the watcher.

mod config;
mod listing;
mod message;
mod watermark;

// Re-export all public types
pub use config::{
    BoardConfig, Config, CrawlerConfig, FetchStrategy, LoggingConfig, NotifierConfig,
    SelectorConfig, StateConfig,
};
pub use listing::{Batch, Listing};
pub use message::{Action, ActionKind, Attachment, DealMessage, Field};
pub use watermark::Watermark;

#[cfg(test)]
pub(crate) use listing::fixtures;
