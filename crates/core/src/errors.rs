use thiserror::Error;

/// Unified error type for the entire watchlist-tracker-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered, but without a usable `historical_data` array.
    /// Recovered per symbol inside the orchestrator — the batch continues.
    #[error("Provider returned unusable data: {0}")]
    ProviderData(String),

    // ── Fetch session ───────────────────────────────────────────────
    #[error("Market is closed")]
    MarketClosed,

    #[error("Fetch already in progress")]
    FetchInProgress,

    #[error("Fetch orchestration failed: {0}")]
    Orchestration(String),

    // ── Business logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Watchlist not found: {0}")]
    WatchlistNotFound(String),

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    // ── Persistence ─────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs so symbol
        // lists and any proxy credentials never end up in logs or messages.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
