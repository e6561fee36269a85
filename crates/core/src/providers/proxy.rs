use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::traits::{QuoteInterval, QuoteMeta, QuoteProvider, QuoteResponse};
use crate::errors::CoreError;
use crate::models::price::PricePoint;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the local HTTP quote proxy.
///
/// The proxy exposes a minimal REST facade over the real market-data vendor:
/// `GET /quote?symbols={symbol}&interval={code}` returns one entry per symbol
/// with a `historicalData` array of ISO-8601-stamped samples. Timestamps are
/// parsed here, once; samples that fail to parse are dropped at this boundary.
pub struct ProxyQuoteProvider {
    client: Client,
    base_url: String,
}

impl ProxyQuoteProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

// ── Proxy wire types ────────────────────────────────────────────────

#[derive(Deserialize)]
struct WireQuote {
    symbol: Option<String>,
    #[serde(rename = "historicalData", default)]
    historical_data: Vec<WirePoint>,
    #[serde(default)]
    meta: Option<QuoteMeta>,
}

#[derive(Deserialize)]
struct WirePoint {
    timestamp: String,
    price: f64,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    open: Option<f64>,
}

/// Parse a proxy timestamp. The proxy emits RFC 3339 for intraday samples
/// and bare dates for daily bars; both normalize to UTC instants.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

impl WirePoint {
    fn into_point(self) -> Option<PricePoint> {
        let timestamp = parse_timestamp(&self.timestamp)?;
        if !self.price.is_finite() {
            return None;
        }
        Some(PricePoint {
            timestamp,
            price: self.price,
            volume: self.volume,
            high: self.high,
            low: self.low,
            open: self.open,
        })
    }
}

#[async_trait]
impl QuoteProvider for ProxyQuoteProvider {
    fn name(&self) -> &str {
        "QuoteProxy"
    }

    async fn fetch_quote(
        &self,
        symbol: &str,
        interval: QuoteInterval,
    ) -> Result<QuoteResponse, CoreError> {
        let upper = symbol.to_uppercase();
        let url = format!(
            "{}/quote?symbols={}&interval={}",
            self.base_url,
            upper,
            interval.code()
        );
        debug!(symbol = %upper, %interval, "proxy quote request");

        let quotes: Vec<WireQuote> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| CoreError::Api {
                provider: "QuoteProxy".into(),
                message: format!("Quote request for {upper} failed: {e}"),
            })?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "QuoteProxy".into(),
                message: format!("Failed to parse response for {upper}: {e}"),
            })?;

        let quote = quotes
            .into_iter()
            .find(|q| {
                q.symbol
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(&upper))
            })
            .ok_or_else(|| CoreError::ProviderData(format!("No quote entry for {upper}")))?;

        let historical_data: Vec<PricePoint> = quote
            .historical_data
            .into_iter()
            .filter_map(WirePoint::into_point)
            .collect();

        Ok(QuoteResponse {
            symbol: upper,
            historical_data,
            meta: quote.meta,
        })
    }
}
