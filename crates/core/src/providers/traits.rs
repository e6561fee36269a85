use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::price::PricePoint;

/// Sampling interval requested from the quote provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteInterval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl QuoteInterval {
    /// The interval code understood by the upstream proxy.
    pub fn code(&self) -> &'static str {
        match self {
            QuoteInterval::Daily => "1d",
            QuoteInterval::Weekly => "1wk",
            QuoteInterval::Monthly => "1mo",
        }
    }
}

impl std::fmt::Display for QuoteInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Provider-supplied context about a quote (exchange, quoting currency).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteMeta {
    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub exchange: Option<String>,
}

/// A validated quote-provider response.
///
/// Validation happens once, at this boundary: by the time a `QuoteResponse`
/// exists, its timestamps are parsed instants. An empty `historical_data`
/// is still possible and is treated by the orchestrator as a skippable
/// per-symbol failure.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResponse {
    pub symbol: String,
    pub historical_data: Vec<PricePoint>,
    pub meta: Option<QuoteMeta>,
}

/// Trait abstraction for the upstream market-data collaborator.
///
/// The orchestrator only ever talks to this trait; swapping the real HTTP
/// proxy for a mock in tests (or for a different upstream later) touches
/// nothing else.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the recent price history for one symbol.
    async fn fetch_quote(
        &self,
        symbol: &str,
        interval: QuoteInterval,
    ) -> Result<QuoteResponse, CoreError>;
}
