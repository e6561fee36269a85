use chrono::{DateTime, NaiveDate, Utc};

use crate::models::price::PricePoint;
use crate::models::window::TimeWindow;

/// The representative start/end samples for a reporting window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSlice {
    pub start_point: PricePoint,
    pub end_point: PricePoint,
}

/// Selects the representative start and end price for an arbitrary
/// reporting window over a time-sorted history.
///
/// Pure business logic — no I/O. The `*_at` variants take the anchoring
/// "now" instant explicitly so the cutoff arithmetic is deterministic
/// under test; the plain variants anchor at `Utc::now()`.
pub struct TimeframeService;

impl TimeframeService {
    pub fn new() -> Self {
        Self
    }

    /// Slice `history` for `window`, anchored at the current instant.
    pub fn slice(
        &self,
        history: &[PricePoint],
        window: TimeWindow,
        buy_date: Option<NaiveDate>,
        buy_price: Option<f64>,
    ) -> Option<WindowSlice> {
        self.slice_at(history, window, buy_date, buy_price, Utc::now())
    }

    /// Slice `history` for `window`, anchored at `now`.
    ///
    /// Returns `None` for an empty history. The end point is always the
    /// chronologically last sample (the freshest known price). The start
    /// point is the earliest sample at or after the window's cutoff; when
    /// the entire history predates the cutoff, the first sample is used
    /// instead — a holding younger than the window reports its full
    /// life-to-date performance rather than an empty window.
    ///
    /// When the chosen start sample falls on the purchase date and a
    /// `buy_price` is provided, the buy price replaces the recorded sample
    /// price. This guards against provider sampling drift at the purchase
    /// instant.
    pub fn slice_at(
        &self,
        history: &[PricePoint],
        window: TimeWindow,
        buy_date: Option<NaiveDate>,
        buy_price: Option<f64>,
        now: DateTime<Utc>,
    ) -> Option<WindowSlice> {
        let first = history.first()?;
        let end_point = history.last()?.clone();

        let mut start_point = match window.cutoff(now) {
            None => first.clone(),
            Some(cutoff) => {
                // History is sorted ascending: the partition point is the
                // earliest sample with timestamp >= cutoff.
                let idx = history.partition_point(|p| p.timestamp < cutoff);
                if idx < history.len() {
                    history[idx].clone()
                } else {
                    first.clone()
                }
            }
        };

        if let (Some(date), Some(price)) = (buy_date, buy_price) {
            if start_point.timestamp.date_naive() == date {
                start_point.price = price;
            }
        }

        Some(WindowSlice {
            start_point,
            end_point,
        })
    }

    /// Index of the sample nearest to `target` in a time-sorted history.
    ///
    /// Binary search; ties between the two neighbouring samples resolve to
    /// the earlier one. `None` for an empty history.
    pub fn closest_index(
        &self,
        history: &[PricePoint],
        target: DateTime<Utc>,
    ) -> Option<usize> {
        if history.is_empty() {
            return None;
        }
        let idx = history.partition_point(|p| p.timestamp < target);
        if idx == 0 {
            return Some(0);
        }
        if idx == history.len() {
            return Some(history.len() - 1);
        }
        let before = target - history[idx - 1].timestamp;
        let after = history[idx].timestamp - target;
        if after < before {
            Some(idx)
        } else {
            Some(idx - 1)
        }
    }
}

impl Default for TimeframeService {
    fn default() -> Self {
        Self::new()
    }
}
