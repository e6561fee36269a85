use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::watchlist::Watchlist;

/// High-level storage operations for the watchlist map.
///
/// The persisted shape is `{ [watchlistId]: { id, name, slug, items } }`
/// serialized as JSON text under one storage key (here: one file). The
/// orchestrator performs no storage I/O itself — its caller persists the
/// map after each progress report, and storage failures surface as
/// `CoreError` rather than being swallowed.
pub struct StorageManager;

impl StorageManager {
    /// Serialize the watchlist map to JSON text.
    pub fn to_json(watchlists: &HashMap<String, Watchlist>) -> Result<String, CoreError> {
        serde_json::to_string_pretty(watchlists)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize watchlists: {e}")))
    }

    /// Deserialize a watchlist map from JSON text.
    pub fn from_json(json: &str) -> Result<HashMap<String, Watchlist>, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::Deserialization(format!("Failed to parse watchlists: {e}")))
    }

    /// Save the watchlist map to a JSON file on disk.
    pub fn save_to_file(
        watchlists: &HashMap<String, Watchlist>,
        path: &str,
    ) -> Result<(), CoreError> {
        let json = Self::to_json(watchlists)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load the watchlist map from a JSON file on disk.
    pub fn load_from_file(path: &str) -> Result<HashMap<String, Watchlist>, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
