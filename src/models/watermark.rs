//! Persisted run watermark.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest listing id already reported, plus when it was recorded.
///
/// Serialized as `{ "lastPostNumber": …, "lastCheckTime": "…" }`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Watermark {
    #[serde(rename = "lastPostNumber")]
    pub last_seen_id: u64,

    #[serde(rename = "lastCheckTime", default)]
    pub last_checked_at: DateTime<Utc>,
}

impl Watermark {
    pub fn new(last_seen_id: u64, last_checked_at: DateTime<Utc>) -> Self {
        Self {
            last_seen_id,
            last_checked_at,
        }
    }
}
