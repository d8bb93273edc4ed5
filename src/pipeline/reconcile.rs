// src/pipeline/reconcile.rs

//! Watermark reconciliation.
//!
//! Compares a fresh batch against the stored watermark and decides which
//! listings are new and what the watermark becomes. Pure; no I/O.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Batch, Listing, Watermark};

/// How a run moves the watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Transition {
    /// Nothing extracted; nothing to compare against
    Empty,
    /// Stored id was ahead of the board; reset to the board maximum
    Repair { from: u64, to: u64 },
    /// Board has listings above the stored id
    Advance { from: u64, to: u64 },
    /// Board maximum equals the stored id
    Idle,
}

impl Transition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Repair { .. } => "repair",
            Self::Advance { .. } => "advance",
            Self::Idle => "idle",
        }
    }
}

/// Result of reconciling one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub transition: Transition,
    /// Listings above the previous watermark, oldest first
    pub new_listings: Vec<Listing>,
    /// Watermark to persist; equal to the input when nothing changes
    pub watermark: Watermark,
}

impl Reconciliation {
    /// Whether the watermark must be written.
    pub fn needs_write(&self) -> bool {
        matches!(
            self.transition,
            Transition::Repair { .. } | Transition::Advance { .. }
        )
    }

    pub fn has_new_listings(&self) -> bool {
        !self.new_listings.is_empty()
    }
}

/// Reconcile `batch` against `watermark` at time `now`.
pub fn reconcile(batch: &Batch, watermark: &Watermark, now: DateTime<Utc>) -> Reconciliation {
    let last_seen = watermark.last_seen_id;

    let Some(latest) = batch.max_id() else {
        return unchanged(Transition::Empty, watermark);
    };

    if last_seen > latest {
        return Reconciliation {
            transition: Transition::Repair {
                from: last_seen,
                to: latest,
            },
            new_listings: Vec::new(),
            watermark: Watermark::new(latest, now),
        };
    }

    if latest > last_seen {
        return Reconciliation {
            transition: Transition::Advance {
                from: last_seen,
                to: latest,
            },
            new_listings: batch.newer_than(last_seen),
            watermark: Watermark::new(latest, now),
        };
    }

    unchanged(Transition::Idle, watermark)
}

fn unchanged(transition: Transition, watermark: &Watermark) -> Reconciliation {
    Reconciliation {
        transition,
        new_listings: Vec::new(),
        watermark: *watermark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::listing;
    use chrono::TimeZone;

    fn batch(ids: &[u64]) -> Batch {
        Batch::from_listings(ids.iter().copied().map(listing).collect())
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
    }

    fn ids(listings: &[Listing]) -> Vec<u64> {
        listings.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_advance_returns_new_listings_ascending() {
        let result = reconcile(&batch(&[105, 103, 101, 99]), &Watermark::new(100, at(0)), at(1));

        assert_eq!(result.transition, Transition::Advance { from: 100, to: 105 });
        assert_eq!(ids(&result.new_listings), vec![101, 103, 105]);
        assert_eq!(result.watermark, Watermark::new(105, at(1)));
        assert!(result.needs_write());
    }

    #[test]
    fn test_first_run_reports_whole_batch() {
        let result = reconcile(&batch(&[3, 1, 2]), &Watermark::default(), at(1));
        assert_eq!(ids(&result.new_listings), vec![1, 2, 3]);
        assert_eq!(result.watermark.last_seen_id, 3);
    }

    #[test]
    fn test_repair_resets_to_batch_maximum() {
        let result = reconcile(&batch(&[105, 103]), &Watermark::new(999_999, at(0)), at(1));

        assert_eq!(
            result.transition,
            Transition::Repair {
                from: 999_999,
                to: 105
            }
        );
        assert!(result.new_listings.is_empty());
        assert_eq!(result.watermark, Watermark::new(105, at(1)));
        assert!(result.needs_write());
    }

    #[test]
    fn test_idle_keeps_watermark() {
        let stored = Watermark::new(105, at(0));
        let result = reconcile(&batch(&[105, 103]), &stored, at(1));

        assert_eq!(result.transition, Transition::Idle);
        assert!(result.new_listings.is_empty());
        assert_eq!(result.watermark, stored);
        assert!(!result.needs_write());
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let stored = Watermark::new(100, at(0));
        let result = reconcile(&Batch::default(), &stored, at(1));

        assert_eq!(result.transition, Transition::Empty);
        assert!(!result.has_new_listings());
        assert_eq!(result.watermark, stored);
        assert!(!result.needs_write());
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let current = batch(&[110, 105, 101]);
        for start in [0, 100, 105, 110, 500] {
            let first = reconcile(&current, &Watermark::new(start, at(0)), at(1));
            let second = reconcile(&current, &first.watermark, at(2));
            assert_eq!(second.transition, Transition::Idle, "start {start}");
            assert!(second.new_listings.is_empty());
        }
    }

    #[test]
    fn test_new_listings_exceed_watermark() {
        let result = reconcile(&batch(&[50, 40, 30, 20]), &Watermark::new(30, at(0)), at(1));
        assert!(result.new_listings.iter().all(|l| l.id > 30));
        assert_eq!(ids(&result.new_listings), vec![40, 50]);
    }

    #[test]
    fn test_transition_serializes_with_kind() {
        let json = serde_json::to_value(Transition::Advance { from: 1, to: 2 }).unwrap();
        assert_eq!(json["kind"], "advance");
        assert_eq!(json["to"], 2);
        assert_eq!(Transition::Idle.label(), "idle");
    }
}
