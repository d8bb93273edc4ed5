//! Watermark persistence.
//!
//! The watermark is a single small JSON document:
//!
//! ```json
//! { "lastPostNumber": 105, "lastCheckTime": "2025-01-01T00:00:00Z" }
//! ```
//!
//! `LocalStateStore` writes it to a file; `S3StateStore` (feature `s3`) keeps
//! it in a bucket for ephemeral hosts.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Watermark;

// Re-export for convenience
pub use local::LocalStateStore;
#[cfg(feature = "s3")]
pub use s3::S3StateStore;

/// Trait for watermark storage backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the stored watermark. `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Watermark>>;

    /// Replace the stored watermark.
    async fn save(&self, watermark: &Watermark) -> Result<()>;

    /// Where the watermark lives, for logs.
    fn location(&self) -> String;
}
