// src/lib.rs

//! Hot deal board watcher library.
//!
//! Fetches the deal board, extracts listings, reconciles them against a
//! persisted watermark and forwards new posts to a chat webhook.

pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
