use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::models::price::PricePoint;

/// Reconciles freshly fetched price series into an existing history.
///
/// Pure business logic — no I/O, no API calls. Easy to test.
pub struct SeriesService;

impl SeriesService {
    pub fn new() -> Self {
        Self
    }

    /// Combine two ordered point collections into one deduplicated,
    /// time-sorted collection.
    ///
    /// Points are keyed by their normalized timestamp; on collision the
    /// point from `incoming` wins (freshest write). The result is sorted
    /// ascending with no duplicate timestamps. Idempotent — merging the
    /// same `incoming` again changes nothing — and total: empty inputs are
    /// fine, nothing here can fail.
    pub fn merge(&self, existing: &[PricePoint], incoming: &[PricePoint]) -> Vec<PricePoint> {
        let mut by_instant: BTreeMap<DateTime<Utc>, PricePoint> = BTreeMap::new();
        for point in existing.iter().chain(incoming.iter()) {
            by_instant.insert(point.timestamp, point.clone());
        }
        by_instant.into_values().collect()
    }

    /// Drop all points strictly earlier than `cutoff`.
    ///
    /// Applied after merge, before the result is stored on a holding, so a
    /// holding's visible history never precedes its purchase date.
    pub fn truncate_before(
        &self,
        history: &[PricePoint],
        cutoff: DateTime<Utc>,
    ) -> Vec<PricePoint> {
        history
            .iter()
            .filter(|p| p.timestamp >= cutoff)
            .cloned()
            .collect()
    }
}

impl Default for SeriesService {
    fn default() -> Self {
        Self::new()
    }
}
