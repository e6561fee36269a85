use chrono::{DateTime, Utc};

use crate::models::holding::Holding;
use crate::models::window::TimeWindow;
use crate::services::timeframe_service::TimeframeService;

/// Computes time-windowed percentage returns for holdings and the
/// unweighted portfolio-level average across a watchlist.
pub struct ReturnsService {
    timeframe_service: TimeframeService,
}

impl ReturnsService {
    pub fn new() -> Self {
        Self {
            timeframe_service: TimeframeService::new(),
        }
    }

    /// Percentage return of a single holding over `window`, anchored at the
    /// current instant. `None` when the holding has no history or the slice
    /// does not yield usable prices.
    pub fn window_return(&self, holding: &Holding, window: TimeWindow) -> Option<f64> {
        self.window_return_at(holding, window, Utc::now())
    }

    /// Percentage return of a single holding over `window`, anchored at `now`.
    pub fn window_return_at(
        &self,
        holding: &Holding,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Option<f64> {
        let slice = self.timeframe_service.slice_at(
            &holding.history,
            window,
            holding.buy_date,
            holding.buy_price,
            now,
        )?;

        let start = slice.start_point.price;
        let end = slice.end_point.price;
        if !start.is_finite() || !end.is_finite() || start <= 0.0 {
            return None;
        }
        Some((end - start) / start * 100.0)
    }

    /// Unweighted arithmetic mean of the window returns across `holdings`,
    /// in percent. Holdings that fail validation (empty history, zero or
    /// non-numeric start price) are excluded from both numerator and
    /// denominator — they do not count as zero. `0.0` when nothing is left.
    pub fn average_return(&self, holdings: &[Holding], window: TimeWindow) -> f64 {
        self.average_return_at(holdings, window, Utc::now())
    }

    /// As `average_return`, anchored at `now`.
    pub fn average_return_at(
        &self,
        holdings: &[Holding],
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> f64 {
        let returns: Vec<f64> = holdings
            .iter()
            .filter_map(|h| self.window_return_at(h, window, now))
            .collect();

        if returns.is_empty() {
            return 0.0;
        }
        returns.iter().sum::<f64>() / returns.len() as f64
    }
}

impl Default for ReturnsService {
    fn default() -> Self {
        Self::new()
    }
}
