use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single sampled price for an instrument.
///
/// Timestamps are parsed from the provider's ISO-8601 strings once, at the
/// boundary — everything inside the core compares typed instants. Within any
/// holding's history, timestamps are unique and strictly ascending (the merge
/// in `SeriesService` normalizes this).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,

    /// Closing/last price at this instant.
    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            price,
            volume: None,
            high: None,
            low: None,
            open: None,
        }
    }
}
