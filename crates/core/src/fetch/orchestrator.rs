use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::session::{FetchSessionStore, FetchStatus, SessionSnapshot};
use super::signals::FetchSignals;
use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingKind};
use crate::models::price::PricePoint;
use crate::providers::gate::MarketGate;
use crate::providers::traits::{QuoteInterval, QuoteProvider};
use crate::services::series_service::SeriesService;

/// Holdings per batch; progress is reported once per completed batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Fixed wait after each symbol — the upstream provider is rate-sensitive.
pub const DEFAULT_SYMBOL_DELAY: Duration = Duration::from_millis(500);

/// Caller-supplied knobs for one `start_fetch` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// True when the user explicitly asked for this refresh (as opposed to
    /// a scheduled one). Logged with the session.
    pub manual: bool,

    /// Run even when the market gate reports closed.
    pub bypass_gate: bool,

    pub interval: QuoteInterval,
}

/// Progress snapshot handed to the caller after each completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    pub tickers_fetched: usize,
    pub total_tickers: usize,
}

/// Final outcome of a `start_fetch` call.
///
/// `holdings` carries whatever was merged before the session ended —
/// partial progress from a cancelled or paused session is retained, never
/// rolled back.
#[derive(Debug, Clone)]
pub struct FetchSummary {
    pub slug: String,
    pub status: FetchStatus,
    pub holdings: Vec<Holding>,
    pub tickers_fetched: usize,
    pub total_tickers: usize,
}

/// Drives batched, rate-limited refresh sessions against the quote
/// provider, one session per watchlist slug.
///
/// All work for one session runs as sequential awaited steps; the only
/// suspension points are the provider call and the inter-symbol delay.
/// Sessions for different slugs may interleave — the orchestrator is
/// `&self`-based and can be shared across tasks via `Arc`.
pub struct FetchOrchestrator {
    provider: Arc<dyn QuoteProvider>,
    gate: Arc<dyn MarketGate>,
    sessions: FetchSessionStore,
    series_service: SeriesService,
    batch_size: usize,
    symbol_delay: Duration,
    /// Requests issued by this orchestrator instance, for logging.
    requests: AtomicU64,
}

impl FetchOrchestrator {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        gate: Arc<dyn MarketGate>,
        sessions: FetchSessionStore,
    ) -> Self {
        Self {
            provider,
            gate,
            sessions,
            series_service: SeriesService::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            symbol_delay: DEFAULT_SYMBOL_DELAY,
            requests: AtomicU64::new(0),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_symbol_delay(mut self, delay: Duration) -> Self {
        self.symbol_delay = delay;
        self
    }

    /// Refresh the price history of every holding in `holdings`.
    ///
    /// Rejections before any network activity:
    /// - the market gate reports closed and `bypass_gate` is not set
    ///   (`CoreError::MarketClosed`);
    /// - an Active session already exists for `slug`
    ///   (`CoreError::FetchInProgress`).
    ///
    /// A Paused session for `slug` is resumed at its recorded batch instead
    /// of starting fresh. Cancellation is not an error: the summary comes
    /// back `Ok` with status `Cancelled` and the partial results merged so
    /// far.
    ///
    /// `on_progress` fires once per completed batch, in strictly increasing
    /// batch order, with the holdings as merged up to that point.
    pub async fn start_fetch<F>(
        &self,
        slug: &str,
        mut holdings: Vec<Holding>,
        mut on_progress: F,
        options: FetchOptions,
    ) -> Result<FetchSummary, CoreError>
    where
        F: FnMut(&[Holding], &FetchProgress) + Send,
    {
        if !options.bypass_gate && !self.gate.is_open() {
            debug!(slug, gate = self.gate.name(), "fetch rejected: market closed");
            return Err(CoreError::MarketClosed);
        }

        let total = holdings.len();
        let total_batches = total.div_ceil(self.batch_size);
        let (signals, start_batch) = self.sessions.begin(slug, total_batches)?;

        if start_batch > 0 {
            info!(slug, start_batch, total_batches, "resuming paused fetch session");
        } else {
            info!(
                slug,
                manual = options.manual,
                total_tickers = total,
                total_batches,
                "fetch session started"
            );
        }

        let run = self
            .run_batches(slug, &mut holdings, &mut on_progress, &options, &signals, start_batch)
            .await;

        match run {
            Ok((status, tickers_fetched)) => {
                self.sessions.finalize(slug, status);
                info!(slug, status = %status, tickers_fetched, "fetch session finished");
                Ok(FetchSummary {
                    slug: slug.to_string(),
                    status,
                    holdings,
                    tickers_fetched,
                    total_tickers: total,
                })
            }
            Err(e) => {
                self.sessions.finalize(slug, FetchStatus::Error);
                warn!(slug, error = %e, "fetch session failed");
                Err(e)
            }
        }
    }

    /// Sequential batch loop. Returns the terminal status (Completed,
    /// Cancelled, or Paused) and the number of symbols attempted across the
    /// whole session. Per-symbol failures are recovered here; an `Err` from
    /// this function is an orchestration-level failure.
    async fn run_batches<F>(
        &self,
        slug: &str,
        holdings: &mut [Holding],
        on_progress: &mut F,
        options: &FetchOptions,
        signals: &FetchSignals,
        start_batch: usize,
    ) -> Result<(FetchStatus, usize), CoreError>
    where
        F: FnMut(&[Holding], &FetchProgress) + Send,
    {
        let total = holdings.len();
        let total_batches = total.div_ceil(self.batch_size);
        // Symbols in batches completed before a pause count as fetched, so
        // progress totals stay monotone across resume.
        let mut fetched = start_batch * self.batch_size;

        for batch_idx in start_batch..total_batches {
            // Record the batch before the signal checks: a pause observed at
            // this boundary must resume with this batch, not the previous one.
            self.sessions.set_current_batch(slug, batch_idx);
            if signals.is_cancelled() {
                return Ok((FetchStatus::Cancelled, fetched));
            }
            if signals.is_paused() {
                return Ok((FetchStatus::Paused, fetched));
            }

            let lo = batch_idx * self.batch_size;
            let hi = (lo + self.batch_size).min(total);

            for idx in lo..hi {
                if signals.is_cancelled() {
                    return Ok((FetchStatus::Cancelled, fetched));
                }
                if signals.is_paused() {
                    return Ok((FetchStatus::Paused, fetched));
                }

                if holdings[idx].kind == HoldingKind::Mock {
                    debug!(slug, symbol = %holdings[idx].symbol, "skipping mock holding");
                    fetched += 1;
                    continue;
                }

                let symbol = holdings[idx].symbol.clone();
                match self.fetch_one(&symbol, options.interval).await {
                    Ok(points) => self.apply_points(&mut holdings[idx], &points),
                    Err(e) => {
                        // Skippable: this symbol stays stale, the batch goes on.
                        warn!(slug, symbol = %symbol, error = %e, "skipping symbol");
                    }
                }
                fetched += 1;

                if !self.symbol_delay.is_zero() {
                    sleep(self.symbol_delay).await;
                }
            }

            on_progress(
                &holdings[..],
                &FetchProgress {
                    tickers_fetched: fetched,
                    total_tickers: total,
                },
            );
        }

        Ok((FetchStatus::Completed, fetched))
    }

    async fn fetch_one(
        &self,
        symbol: &str,
        interval: QuoteInterval,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let request = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(symbol, request, provider = self.provider.name(), "quote request");

        let response = self.provider.fetch_quote(symbol, interval).await?;
        if response.historical_data.is_empty() {
            return Err(CoreError::ProviderData(format!(
                "Empty historical data for {symbol}"
            )));
        }
        Ok(response.historical_data)
    }

    /// Merge fetched points into the holding's history and drop anything
    /// earlier than its purchase date.
    fn apply_points(&self, holding: &mut Holding, points: &[PricePoint]) {
        let merged = self.series_service.merge(&holding.history, points);
        holding.history = match holding.buy_cutoff() {
            Some(cutoff) => self.series_service.truncate_before(&merged, cutoff),
            None => merged,
        };
    }

    // ── Session queries ─────────────────────────────────────────────

    /// Current state of the session for `slug`, if any. No side effects.
    pub fn fetch_status(&self, slug: &str) -> Option<SessionSnapshot> {
        self.sessions.snapshot(slug)
    }

    /// Signal cooperative cancellation. Takes effect at the session's next
    /// poll point; already-merged holdings are retained.
    pub fn cancel_fetch(&self, slug: &str) -> bool {
        self.sessions.request_cancel(slug)
    }

    /// Signal cooperative pause. The session records its current batch so a
    /// later `start_fetch` for the same slug resumes there.
    pub fn pause_fetch(&self, slug: &str) -> bool {
        self.sessions.request_pause(slug)
    }

    /// Total quote requests issued by this orchestrator instance.
    pub fn requests_issued(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}
