pub mod errors;
pub mod fetch;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use errors::CoreError;
use fetch::orchestrator::{FetchOptions, FetchOrchestrator, FetchProgress, FetchSummary};
use fetch::session::{FetchSessionStore, SessionSnapshot};
use models::holding::Holding;
use models::price::PricePoint;
use models::watchlist::Watchlist;
use models::window::TimeWindow;
use providers::gate::MarketGate;
use providers::traits::QuoteProvider;
use services::returns_service::ReturnsService;
use services::timeframe_service::TimeframeService;
use storage::manager::StorageManager;

/// Main entry point for the Watchlist Tracker core library.
///
/// Owns the watchlist map and all services needed to operate on it. The
/// quote provider and market gate are injected so the frontend (or a test)
/// decides what the tracker talks to.
#[must_use]
pub struct WatchlistTracker {
    /// Watchlists keyed by id — the persisted shape.
    watchlists: HashMap<String, Watchlist>,
    orchestrator: Arc<FetchOrchestrator>,
    timeframe_service: TimeframeService,
    returns_service: ReturnsService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for WatchlistTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchlistTracker")
            .field("watchlists", &self.watchlists.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl WatchlistTracker {
    /// Create a tracker with an empty watchlist map.
    pub fn new(provider: Arc<dyn QuoteProvider>, gate: Arc<dyn MarketGate>) -> Self {
        Self::build(HashMap::new(), provider, gate)
    }

    /// Restore a tracker from previously saved JSON text.
    pub fn from_json(
        json: &str,
        provider: Arc<dyn QuoteProvider>,
        gate: Arc<dyn MarketGate>,
    ) -> Result<Self, CoreError> {
        let watchlists = StorageManager::from_json(json)?;
        Ok(Self::build(watchlists, provider, gate))
    }

    /// Restore a tracker from a JSON file on disk.
    pub fn load_from_file(
        path: &str,
        provider: Arc<dyn QuoteProvider>,
        gate: Arc<dyn MarketGate>,
    ) -> Result<Self, CoreError> {
        let watchlists = StorageManager::load_from_file(path)?;
        Ok(Self::build(watchlists, provider, gate))
    }

    /// Serialize the watchlist map to JSON text.
    pub fn to_json(&self) -> Result<String, CoreError> {
        StorageManager::to_json(&self.watchlists)
    }

    /// Save the watchlist map to disk. Clears the unsaved-changes flag on
    /// success.
    pub fn save_to_file(&mut self, path: &str) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.watchlists, path)?;
        self.dirty = false;
        Ok(())
    }

    // ── Watchlist management ────────────────────────────────────────

    /// Create a new empty watchlist. Returns its slug.
    pub fn create_watchlist(&mut self, name: &str) -> Result<String, CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::ValidationError(
                "Watchlist name must not be empty".into(),
            ));
        }
        let watchlist = Watchlist::new(trimmed);
        if watchlist.slug.is_empty() {
            return Err(CoreError::ValidationError(format!(
                "Watchlist name '{trimmed}' does not produce a usable slug"
            )));
        }
        if self.watchlist_by_slug(&watchlist.slug).is_some() {
            return Err(CoreError::ValidationError(format!(
                "A watchlist with slug '{}' already exists",
                watchlist.slug
            )));
        }
        let slug = watchlist.slug.clone();
        self.watchlists.insert(watchlist.id.to_string(), watchlist);
        self.dirty = true;
        Ok(slug)
    }

    /// Remove a watchlist by slug. Returns the removed watchlist.
    pub fn remove_watchlist(&mut self, slug: &str) -> Result<Watchlist, CoreError> {
        let id = self
            .watchlist_by_slug(slug)
            .map(|w| w.id.to_string())
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?;
        let removed = self
            .watchlists
            .remove(&id)
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?;
        self.dirty = true;
        Ok(removed)
    }

    #[must_use]
    pub fn get_watchlist(&self, slug: &str) -> Option<&Watchlist> {
        self.watchlist_by_slug(slug)
    }

    /// All watchlists, sorted by name for deterministic display order.
    #[must_use]
    pub fn watchlists(&self) -> Vec<&Watchlist> {
        let mut lists: Vec<&Watchlist> = self.watchlists.values().collect();
        lists.sort_by(|a, b| a.name.cmp(&b.name));
        lists
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Add a holding to a watchlist. Rejects duplicate symbols.
    pub fn add_holding(
        &mut self,
        slug: &str,
        symbol: &str,
        buy_date: Option<NaiveDate>,
        buy_price: Option<f64>,
    ) -> Result<(), CoreError> {
        if symbol.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Symbol must not be empty".into(),
            ));
        }
        if let Some(price) = buy_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Buy price for {symbol} must be positive, got {price}"
                )));
            }
        }
        let watchlist = self
            .watchlist_by_slug_mut(slug)
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?;
        if watchlist.holding(symbol).is_some() {
            return Err(CoreError::ValidationError(format!(
                "{} is already tracked in '{}'",
                symbol.to_uppercase(),
                watchlist.name
            )));
        }
        watchlist
            .items
            .push(Holding::new(symbol, buy_date, buy_price));
        self.dirty = true;
        Ok(())
    }

    /// Add a mock holding with pre-seeded synthetic history (demo data —
    /// never refreshed against the provider).
    pub fn add_mock_holding(
        &mut self,
        slug: &str,
        symbol: &str,
        history: Vec<PricePoint>,
    ) -> Result<(), CoreError> {
        let watchlist = self
            .watchlist_by_slug_mut(slug)
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?;
        if watchlist.holding(symbol).is_some() {
            return Err(CoreError::ValidationError(format!(
                "{} is already tracked in '{}'",
                symbol.to_uppercase(),
                watchlist.name
            )));
        }
        watchlist.items.push(Holding::mock(symbol, history));
        self.dirty = true;
        Ok(())
    }

    /// Remove a holding by symbol. Returns the removed holding.
    pub fn remove_holding(&mut self, slug: &str, symbol: &str) -> Result<Holding, CoreError> {
        let watchlist = self
            .watchlist_by_slug_mut(slug)
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?;
        let upper = symbol.to_uppercase();
        let idx = watchlist
            .items
            .iter()
            .position(|h| h.symbol == upper)
            .ok_or_else(|| CoreError::HoldingNotFound(upper.clone()))?;
        let removed = watchlist.items.remove(idx);
        self.dirty = true;
        Ok(removed)
    }

    /// Explicit user edit of a holding's purchase anchors. The history is
    /// re-truncated against the new purchase date on the next refresh.
    pub fn set_purchase(
        &mut self,
        slug: &str,
        symbol: &str,
        buy_date: Option<NaiveDate>,
        buy_price: Option<f64>,
    ) -> Result<(), CoreError> {
        if let Some(price) = buy_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Buy price for {symbol} must be positive, got {price}"
                )));
            }
        }
        let watchlist = self
            .watchlist_by_slug_mut(slug)
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?;
        let holding = watchlist
            .holding_mut(symbol)
            .ok_or_else(|| CoreError::HoldingNotFound(symbol.to_uppercase()))?;
        holding.buy_date = buy_date;
        holding.buy_price = buy_price;
        self.dirty = true;
        Ok(())
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Refresh the price history of every holding in a watchlist.
    ///
    /// Wires the watchlist's items through the fetch orchestrator and
    /// applies the refreshed holdings back to the map — including the
    /// partial results of a cancelled or paused session. The caller should
    /// persist after this returns (and may persist inside `on_progress`
    /// using the snapshot it is handed).
    pub async fn refresh_watchlist<F>(
        &mut self,
        slug: &str,
        on_progress: F,
        options: FetchOptions,
    ) -> Result<FetchSummary, CoreError>
    where
        F: FnMut(&[Holding], &FetchProgress) + Send,
    {
        let items = self
            .watchlist_by_slug(slug)
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?
            .items
            .clone();

        let orchestrator = Arc::clone(&self.orchestrator);
        let summary = orchestrator
            .start_fetch(slug, items, on_progress, options)
            .await?;

        if let Some(watchlist) = self.watchlist_by_slug_mut(slug) {
            watchlist.items = summary.holdings.clone();
            self.dirty = true;
        }
        Ok(summary)
    }

    /// Current state of the fetch session for `slug`, if any.
    #[must_use]
    pub fn fetch_status(&self, slug: &str) -> Option<SessionSnapshot> {
        self.orchestrator.fetch_status(slug)
    }

    /// Signal cancellation of the fetch session for `slug`.
    pub fn cancel_fetch(&self, slug: &str) -> bool {
        self.orchestrator.cancel_fetch(slug)
    }

    /// Signal pause of the fetch session for `slug`.
    pub fn pause_fetch(&self, slug: &str) -> bool {
        self.orchestrator.pause_fetch(slug)
    }

    // ── Returns ─────────────────────────────────────────────────────

    /// Unweighted average percentage return across a watchlist's holdings
    /// for a reporting window. `0.0` when no holding yields a valid slice.
    pub fn average_return(&self, slug: &str, window: TimeWindow) -> Result<f64, CoreError> {
        let watchlist = self
            .watchlist_by_slug(slug)
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?;
        Ok(self.returns_service.average_return(&watchlist.items, window))
    }

    /// Percentage return of a single holding for a reporting window.
    /// `Ok(None)` when the holding has no usable slice for the window.
    pub fn holding_return(
        &self,
        slug: &str,
        symbol: &str,
        window: TimeWindow,
    ) -> Result<Option<f64>, CoreError> {
        let watchlist = self
            .watchlist_by_slug(slug)
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?;
        let holding = watchlist
            .holding(symbol)
            .ok_or_else(|| CoreError::HoldingNotFound(symbol.to_uppercase()))?;
        Ok(self.returns_service.window_return(holding, window))
    }

    /// The representative start/end samples a holding's figures are built
    /// from, for display alongside the computed return.
    pub fn holding_slice(
        &self,
        slug: &str,
        symbol: &str,
        window: TimeWindow,
    ) -> Result<Option<services::timeframe_service::WindowSlice>, CoreError> {
        let watchlist = self
            .watchlist_by_slug(slug)
            .ok_or_else(|| CoreError::WatchlistNotFound(slug.to_string()))?;
        let holding = watchlist
            .holding(symbol)
            .ok_or_else(|| CoreError::HoldingNotFound(symbol.to_uppercase()))?;
        Ok(self.timeframe_service.slice(
            &holding.history,
            window,
            holding.buy_date,
            holding.buy_price,
        ))
    }

    // ── Dirty state ─────────────────────────────────────────────────

    /// Returns `true` if the map has been modified since the last save or
    /// load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(
        watchlists: HashMap<String, Watchlist>,
        provider: Arc<dyn QuoteProvider>,
        gate: Arc<dyn MarketGate>,
    ) -> Self {
        let orchestrator = Arc::new(FetchOrchestrator::new(
            provider,
            gate,
            FetchSessionStore::new(),
        ));
        Self {
            watchlists,
            orchestrator,
            timeframe_service: TimeframeService::new(),
            returns_service: ReturnsService::new(),
            dirty: false,
        }
    }

    fn watchlist_by_slug(&self, slug: &str) -> Option<&Watchlist> {
        self.watchlists.values().find(|w| w.slug == slug)
    }

    fn watchlist_by_slug_mut(&mut self, slug: &str) -> Option<&mut Watchlist> {
        self.watchlists.values_mut().find(|w| w.slug == slug)
    }
}
