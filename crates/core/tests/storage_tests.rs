// ═══════════════════════════════════════════════════════════════════
// Storage Tests — StorageManager JSON round trips and file I/O
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use watchlist_tracker_core::errors::CoreError;
use watchlist_tracker_core::models::holding::Holding;
use watchlist_tracker_core::models::price::PricePoint;
use watchlist_tracker_core::models::watchlist::Watchlist;
use watchlist_tracker_core::storage::manager::StorageManager;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sample_map() -> HashMap<String, Watchlist> {
    let mut tech = Watchlist::new("Tech Giants");
    let mut aapl = Holding::new("AAPL", Some(d(2024, 6, 2)), Some(110.0));
    aapl.history = vec![
        PricePoint::new(ts("2024-06-02T00:00:00Z"), 110.0),
        PricePoint::new(ts("2024-06-03T00:00:00Z"), 120.0),
    ];
    tech.items.push(aapl);
    tech.items.push(Holding::new("MSFT", None, None));

    let dividends = Watchlist::new("Dividends");

    let mut map = HashMap::new();
    map.insert(tech.id.to_string(), tech);
    map.insert(dividends.id.to_string(), dividends);
    map
}

#[test]
fn json_roundtrip_preserves_everything() {
    let map = sample_map();
    let json = StorageManager::to_json(&map).unwrap();
    let back = StorageManager::from_json(&json).unwrap();
    assert_eq!(map, back);
}

#[test]
fn persisted_shape_is_keyed_by_watchlist_id() {
    let map = sample_map();
    let json = StorageManager::to_json(&map).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    for (key, entry) in object {
        assert_eq!(entry["id"].as_str().unwrap(), key);
        assert!(entry["slug"].is_string());
        assert!(entry["items"].is_array());
    }
}

#[test]
fn empty_object_loads_as_empty_map() {
    let map = StorageManager::from_json("{}").unwrap();
    assert!(map.is_empty());
}

#[test]
fn malformed_json_is_a_deserialization_error() {
    let err = StorageManager::from_json("{not json").unwrap_err();
    assert!(matches!(err, CoreError::Deserialization(_)));
}

#[test]
fn wrong_shape_is_a_deserialization_error() {
    let err = StorageManager::from_json(r#"[1, 2, 3]"#).unwrap_err();
    assert!(matches!(err, CoreError::Deserialization(_)));
}

#[test]
fn file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("watchlists.json");
    let path = path.to_str().unwrap();

    let map = sample_map();
    StorageManager::save_to_file(&map, path).unwrap();
    let back = StorageManager::load_from_file(path).unwrap();
    assert_eq!(map, back);
}

#[test]
fn loading_a_missing_file_is_a_file_io_error() {
    let err = StorageManager::load_from_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, CoreError::FileIO(_)));
}
