use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::price::PricePoint;

/// Whether a holding tracks a real instrument or demo/synthetic data.
/// Mock holdings are never refreshed against the upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingKind {
    #[default]
    Real,
    Mock,
}

impl std::fmt::Display for HoldingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoldingKind::Real => write!(f, "real"),
            HoldingKind::Mock => write!(f, "mock"),
        }
    }
}

/// One tracked instrument within a watchlist.
///
/// `buy_date`/`buy_price` anchor every return calculation. They are only
/// changed through an explicit user edit; the fetch orchestrator mutates
/// `history` alone. Both are optional — a holding added without purchase
/// metadata degrades gracefully (its first recorded sample stands in for the
/// purchase instant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol, uppercased (e.g., "AAPL", "MSFT").
    pub symbol: String,

    #[serde(default)]
    pub buy_date: Option<NaiveDate>,

    #[serde(default)]
    pub buy_price: Option<f64>,

    /// Ordered price series, oldest first. Mutated only by merge/truncation.
    #[serde(default)]
    pub history: Vec<PricePoint>,

    #[serde(default)]
    pub kind: HoldingKind,
}

impl Holding {
    pub fn new(
        symbol: impl Into<String>,
        buy_date: Option<NaiveDate>,
        buy_price: Option<f64>,
    ) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            buy_date,
            buy_price,
            history: Vec::new(),
            kind: HoldingKind::Real,
        }
    }

    /// Create a mock holding carrying pre-seeded synthetic history.
    pub fn mock(symbol: impl Into<String>, history: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            buy_date: None,
            buy_price: None,
            history,
            kind: HoldingKind::Mock,
        }
    }

    /// The instant before which history is not kept: midnight UTC on the
    /// purchase date. `None` when no purchase date is set.
    pub fn buy_cutoff(&self) -> Option<DateTime<Utc>> {
        self.buy_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}
