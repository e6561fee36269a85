use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::holding::Holding;

/// A user-curated list of tracked instruments.
///
/// This is the persisted shape: the storage layer serializes a map of
/// watchlist id → `Watchlist` as JSON text under one storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    pub id: Uuid,

    /// Display name as the user typed it.
    pub name: String,

    /// URL-safe identifier derived from the name; fetch sessions are keyed
    /// by this slug.
    pub slug: String,

    pub items: Vec<Holding>,
}

impl Watchlist {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
            items: Vec::new(),
        }
    }

    /// Find a holding by symbol (case-insensitive).
    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        let upper = symbol.to_uppercase();
        self.items.iter().find(|h| h.symbol == upper)
    }

    pub fn holding_mut(&mut self, symbol: &str) -> Option<&mut Holding> {
        let upper = symbol.to_uppercase();
        self.items.iter_mut().find(|h| h.symbol == upper)
    }
}

/// Derive a URL-safe slug from a display name: lowercase, runs of
/// non-alphanumeric characters collapsed to single dashes, no leading or
/// trailing dash.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
