// ═══════════════════════════════════════════════════════════════════
// Service Tests — SeriesService, TimeframeService, ReturnsService
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, NaiveDate, Utc};

use watchlist_tracker_core::models::holding::Holding;
use watchlist_tracker_core::models::price::PricePoint;
use watchlist_tracker_core::models::window::TimeWindow;
use watchlist_tracker_core::services::returns_service::ReturnsService;
use watchlist_tracker_core::services::series_service::SeriesService;
use watchlist_tracker_core::services::timeframe_service::TimeframeService;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn pt(s: &str, price: f64) -> PricePoint {
    PricePoint::new(ts(s), price)
}

// ═══════════════════════════════════════════════════════════════════
//  SeriesService
// ═══════════════════════════════════════════════════════════════════

mod series {
    use super::*;

    #[test]
    fn merge_of_empty_inputs_is_empty() {
        let series = SeriesService::new();
        assert!(series.merge(&[], &[]).is_empty());
    }

    #[test]
    fn merge_with_empty_incoming_is_unchanged() {
        let series = SeriesService::new();
        let existing = vec![pt("2024-01-01T00:00:00Z", 10.0), pt("2024-01-02T00:00:00Z", 11.0)];
        assert_eq!(series.merge(&existing, &[]), existing);
    }

    #[test]
    fn merge_with_empty_existing_adopts_incoming() {
        let series = SeriesService::new();
        let incoming = vec![pt("2024-01-01T00:00:00Z", 10.0)];
        assert_eq!(series.merge(&[], &incoming), incoming);
    }

    #[test]
    fn merge_collision_resolves_in_favor_of_incoming() {
        let series = SeriesService::new();
        let existing = vec![pt("2024-01-01T00:00:00Z", 1.0)];
        let incoming = vec![
            pt("2024-01-01T00:00:00Z", 2.0),
            pt("2024-01-02T00:00:00Z", 3.0),
        ];
        let merged = series.merge(&existing, &incoming);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].price, 2.0);
        assert_eq!(merged[1].price, 3.0);
    }

    #[test]
    fn merge_is_idempotent() {
        let series = SeriesService::new();
        let a = vec![
            pt("2024-01-01T00:00:00Z", 10.0),
            pt("2024-01-03T00:00:00Z", 12.0),
        ];
        let b = vec![
            pt("2024-01-02T00:00:00Z", 11.0),
            pt("2024-01-03T00:00:00Z", 12.5),
        ];
        let once = series.merge(&a, &b);
        let twice = series.merge(&once, &b);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_sorts_ascending_and_deduplicates() {
        let series = SeriesService::new();
        let existing = vec![
            pt("2024-01-05T00:00:00Z", 5.0),
            pt("2024-01-01T00:00:00Z", 1.0),
        ];
        let incoming = vec![
            pt("2024-01-03T00:00:00Z", 3.0),
            pt("2024-01-05T00:00:00Z", 5.5),
        ];
        let merged = series.merge(&existing, &incoming);
        let stamps: Vec<_> = merged.iter().map(|p| p.timestamp).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(stamps, sorted);
        assert_eq!(merged.len(), 3);
        // The duplicate instant carries the incoming price.
        assert_eq!(merged.last().unwrap().price, 5.5);
    }

    #[test]
    fn merge_preserves_ohlcv_fields() {
        let series = SeriesService::new();
        let incoming = vec![PricePoint {
            timestamp: ts("2024-01-01T00:00:00Z"),
            price: 10.0,
            volume: Some(5000.0),
            high: Some(10.5),
            low: Some(9.5),
            open: Some(9.8),
        }];
        let merged = series.merge(&[], &incoming);
        assert_eq!(merged[0].volume, Some(5000.0));
        assert_eq!(merged[0].high, Some(10.5));
    }

    #[test]
    fn truncate_before_drops_strictly_earlier_points() {
        let series = SeriesService::new();
        let history = vec![
            pt("2024-01-01T00:00:00Z", 1.0),
            pt("2024-01-02T00:00:00Z", 2.0),
            pt("2024-01-03T00:00:00Z", 3.0),
        ];
        let cut = series.truncate_before(&history, ts("2024-01-02T00:00:00Z"));
        assert_eq!(cut.len(), 2);
        // The point exactly at the cutoff survives.
        assert_eq!(cut[0].timestamp, ts("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn truncate_before_of_empty_history_is_empty() {
        let series = SeriesService::new();
        assert!(series
            .truncate_before(&[], ts("2024-01-01T00:00:00Z"))
            .is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  TimeframeService
// ═══════════════════════════════════════════════════════════════════

mod timeframe {
    use super::*;

    const NOW: &str = "2024-06-15T12:00:00Z";

    fn sample_history() -> Vec<PricePoint> {
        vec![
            pt("2024-01-02T00:00:00Z", 100.0),
            pt("2024-05-20T00:00:00Z", 110.0),
            pt("2024-06-10T00:00:00Z", 112.0),
            pt("2024-06-14T00:00:00Z", 118.0),
            pt("2024-06-15T00:00:00Z", 120.0),
        ]
    }

    #[test]
    fn empty_history_yields_none() {
        let svc = TimeframeService::new();
        for window in [TimeWindow::Day, TimeWindow::Max, TimeWindow::YearToDate] {
            assert!(svc
                .slice_at(&[], window, Some(d(2024, 1, 1)), None, ts(NOW))
                .is_none());
        }
    }

    #[test]
    fn max_uses_first_and_last_points() {
        let svc = TimeframeService::new();
        let history = sample_history();
        let slice = svc
            .slice_at(&history, TimeWindow::Max, None, None, ts(NOW))
            .unwrap();
        assert_eq!(slice.start_point, history[0]);
        assert_eq!(slice.end_point, history[4]);
    }

    #[test]
    fn end_point_is_always_the_last_sample() {
        let svc = TimeframeService::new();
        let history = sample_history();
        for window in [
            TimeWindow::Day,
            TimeWindow::Week,
            TimeWindow::Month,
            TimeWindow::Year,
            TimeWindow::YearToDate,
            TimeWindow::Max,
        ] {
            let slice = svc
                .slice_at(&history, window, None, None, ts(NOW))
                .unwrap();
            assert_eq!(slice.end_point.price, 120.0, "window {window}");
        }
    }

    #[test]
    fn week_picks_earliest_point_at_or_after_cutoff() {
        let svc = TimeframeService::new();
        // Cutoff = 2024-06-08T12:00:00Z → first qualifying sample is June 10.
        let slice = svc
            .slice_at(&sample_history(), TimeWindow::Week, None, None, ts(NOW))
            .unwrap();
        assert_eq!(slice.start_point.price, 112.0);
    }

    #[test]
    fn month_picks_earliest_point_at_or_after_cutoff() {
        let svc = TimeframeService::new();
        // Cutoff = 2024-05-15T12:00:00Z → first qualifying sample is May 20.
        let slice = svc
            .slice_at(&sample_history(), TimeWindow::Month, None, None, ts(NOW))
            .unwrap();
        assert_eq!(slice.start_point.price, 110.0);
    }

    #[test]
    fn day_picks_sample_on_current_day() {
        let svc = TimeframeService::new();
        let slice = svc
            .slice_at(&sample_history(), TimeWindow::Day, None, None, ts(NOW))
            .unwrap();
        assert_eq!(slice.start_point.price, 120.0);
    }

    #[test]
    fn ytd_picks_earliest_point_of_current_year() {
        let svc = TimeframeService::new();
        let slice = svc
            .slice_at(&sample_history(), TimeWindow::YearToDate, None, None, ts(NOW))
            .unwrap();
        assert_eq!(slice.start_point.price, 100.0);
    }

    #[test]
    fn history_entirely_before_cutoff_falls_back_to_first_point() {
        let svc = TimeframeService::new();
        // Everything predates the current day: a holding older than the
        // window but without fresh samples reports life-to-date.
        let history = vec![
            pt("2023-02-01T00:00:00Z", 50.0),
            pt("2023-03-01T00:00:00Z", 55.0),
        ];
        let slice = svc
            .slice_at(&history, TimeWindow::Day, None, None, ts(NOW))
            .unwrap();
        assert_eq!(slice.start_point.price, 50.0);
        assert_eq!(slice.end_point.price, 55.0);
    }

    #[test]
    fn buy_price_overrides_sample_on_purchase_date() {
        let svc = TimeframeService::new();
        let history = vec![
            pt("2024-01-02T00:00:00Z", 100.0),
            pt("2024-06-14T00:00:00Z", 118.0),
        ];
        // Start sample falls on the purchase date; caller-provided buy
        // price wins over the recorded sample.
        let slice = svc
            .slice_at(
                &history,
                TimeWindow::Max,
                Some(d(2024, 1, 2)),
                Some(101.5),
                ts(NOW),
            )
            .unwrap();
        assert_eq!(slice.start_point.price, 101.5);
        assert_eq!(slice.end_point.price, 118.0);
    }

    #[test]
    fn buy_price_ignored_when_start_is_not_on_purchase_date() {
        let svc = TimeframeService::new();
        let slice = svc
            .slice_at(
                &sample_history(),
                TimeWindow::Week,
                Some(d(2024, 1, 2)),
                Some(99.0),
                ts(NOW),
            )
            .unwrap();
        assert_eq!(slice.start_point.price, 112.0);
    }

    #[test]
    fn missing_buy_date_degrades_gracefully() {
        let svc = TimeframeService::new();
        let slice = svc
            .slice_at(&sample_history(), TimeWindow::Max, None, Some(99.0), ts(NOW))
            .unwrap();
        // No purchase date to match — the recorded first sample stands.
        assert_eq!(slice.start_point.price, 100.0);
    }

    // ── closest_index ─────────────────────────────────────────────

    #[test]
    fn closest_index_empty_history_is_none() {
        let svc = TimeframeService::new();
        assert!(svc.closest_index(&[], ts(NOW)).is_none());
    }

    #[test]
    fn closest_index_exact_match() {
        let svc = TimeframeService::new();
        let history = sample_history();
        assert_eq!(
            svc.closest_index(&history, ts("2024-06-10T00:00:00Z")),
            Some(2)
        );
    }

    #[test]
    fn closest_index_before_first_clamps_to_zero() {
        let svc = TimeframeService::new();
        assert_eq!(
            svc.closest_index(&sample_history(), ts("2020-01-01T00:00:00Z")),
            Some(0)
        );
    }

    #[test]
    fn closest_index_after_last_clamps_to_end() {
        let svc = TimeframeService::new();
        assert_eq!(
            svc.closest_index(&sample_history(), ts("2030-01-01T00:00:00Z")),
            Some(4)
        );
    }

    #[test]
    fn closest_index_picks_nearer_neighbour() {
        let svc = TimeframeService::new();
        let history = sample_history();
        // 2024-06-13 is one day from June 14 and three from June 10.
        assert_eq!(
            svc.closest_index(&history, ts("2024-06-13T00:00:00Z")),
            Some(3)
        );
        // 2024-06-11 is one day from June 10 and three from June 14.
        assert_eq!(
            svc.closest_index(&history, ts("2024-06-11T00:00:00Z")),
            Some(2)
        );
    }

    #[test]
    fn closest_index_tie_resolves_to_earlier_sample() {
        let svc = TimeframeService::new();
        let history = vec![
            pt("2024-06-10T00:00:00Z", 1.0),
            pt("2024-06-14T00:00:00Z", 2.0),
        ];
        assert_eq!(
            svc.closest_index(&history, ts("2024-06-12T00:00:00Z")),
            Some(0)
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ReturnsService
// ═══════════════════════════════════════════════════════════════════

mod returns {
    use super::*;

    const NOW: &str = "2024-06-15T12:00:00Z";

    fn holding_with(history: Vec<PricePoint>) -> Holding {
        let mut h = Holding::new("TEST", None, None);
        h.history = history;
        h
    }

    #[test]
    fn average_return_of_no_holdings_is_zero() {
        let svc = ReturnsService::new();
        assert_eq!(svc.average_return_at(&[], TimeWindow::Day, ts(NOW)), 0.0);
    }

    #[test]
    fn worked_example_fifty_percent_over_max() {
        let svc = ReturnsService::new();
        let mut h = Holding::new("ACME", Some(d(2024, 1, 1)), None);
        h.history = vec![
            pt("2024-01-01T00:00:00Z", 10.0),
            pt("2024-01-10T00:00:00Z", 12.0),
            pt("2024-02-01T00:00:00Z", 15.0),
        ];
        let ret = svc.window_return_at(&h, TimeWindow::Max, ts(NOW)).unwrap();
        assert_eq!(ret, 50.0);
        let avg = svc.average_return_at(&[h], TimeWindow::Max, ts(NOW));
        assert_eq!(avg, 50.0);
    }

    #[test]
    fn window_return_none_for_empty_history() {
        let svc = ReturnsService::new();
        let h = holding_with(vec![]);
        assert!(svc.window_return_at(&h, TimeWindow::Max, ts(NOW)).is_none());
    }

    #[test]
    fn window_return_none_for_zero_start_price() {
        let svc = ReturnsService::new();
        let h = holding_with(vec![
            pt("2024-01-01T00:00:00Z", 0.0),
            pt("2024-02-01T00:00:00Z", 5.0),
        ]);
        assert!(svc.window_return_at(&h, TimeWindow::Max, ts(NOW)).is_none());
    }

    #[test]
    fn window_return_none_for_non_finite_price() {
        let svc = ReturnsService::new();
        let h = holding_with(vec![
            pt("2024-01-01T00:00:00Z", 10.0),
            pt("2024-02-01T00:00:00Z", f64::NAN),
        ]);
        assert!(svc.window_return_at(&h, TimeWindow::Max, ts(NOW)).is_none());
    }

    #[test]
    fn negative_returns_are_reported() {
        let svc = ReturnsService::new();
        let h = holding_with(vec![
            pt("2024-01-01T00:00:00Z", 100.0),
            pt("2024-02-01T00:00:00Z", 80.0),
        ]);
        let ret = svc.window_return_at(&h, TimeWindow::Max, ts(NOW)).unwrap();
        assert_eq!(ret, -20.0);
    }

    #[test]
    fn average_is_unweighted_mean_across_holdings() {
        let svc = ReturnsService::new();
        let up = holding_with(vec![
            pt("2024-01-01T00:00:00Z", 10.0),
            pt("2024-02-01T00:00:00Z", 15.0),
        ]);
        let down = holding_with(vec![
            pt("2024-01-01T00:00:00Z", 100.0),
            pt("2024-02-01T00:00:00Z", 90.0),
        ]);
        // +50% and -10% → mean +20%.
        let avg = svc.average_return_at(&[up, down], TimeWindow::Max, ts(NOW));
        assert!((avg - 20.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_holdings_are_excluded_from_the_mean() {
        let svc = ReturnsService::new();
        let valid = holding_with(vec![
            pt("2024-01-01T00:00:00Z", 10.0),
            pt("2024-02-01T00:00:00Z", 15.0),
        ]);
        let empty = holding_with(vec![]);
        let zero_start = holding_with(vec![
            pt("2024-01-01T00:00:00Z", 0.0),
            pt("2024-02-01T00:00:00Z", 1.0),
        ]);
        // Excluded holdings do not drag the mean toward zero.
        let avg = svc.average_return_at(&[valid, empty, zero_start], TimeWindow::Max, ts(NOW));
        assert_eq!(avg, 50.0);
    }

    #[test]
    fn average_of_only_invalid_holdings_is_zero() {
        let svc = ReturnsService::new();
        let empty = holding_with(vec![]);
        assert_eq!(
            svc.average_return_at(&[empty], TimeWindow::Max, ts(NOW)),
            0.0
        );
    }
}
