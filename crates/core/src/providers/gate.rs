use chrono::{Datelike, NaiveTime, Utc, Weekday};

/// Zero-argument predicate deciding whether a scheduled fetch should run.
/// `start_fetch` consults it before any network activity; callers can
/// override a closed gate with `bypass_gate` (e.g. for a manual refresh).
pub trait MarketGate: Send + Sync {
    fn name(&self) -> &str;

    fn is_open(&self) -> bool;
}

/// Approximation of US equity regular trading hours: Monday–Friday,
/// 13:30–20:00 UTC (9:30–16:00 New York without DST tracking). Deliberately
/// coarse — the gate exists to avoid hammering the provider off-hours, not
/// to be an exchange calendar.
pub struct UsEquityHoursGate;

impl MarketGate for UsEquityHoursGate {
    fn name(&self) -> &str {
        "UsEquityHours"
    }

    fn is_open(&self) -> bool {
        let now = Utc::now();
        match now.weekday() {
            Weekday::Sat | Weekday::Sun => return false,
            _ => {}
        }
        let open = NaiveTime::from_hms_opt(13, 30, 0).unwrap_or(NaiveTime::MIN);
        let close = NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN);
        let t = now.time();
        t >= open && t < close
    }
}

/// A gate that is always open — for tests and offline tooling.
pub struct AlwaysOpenGate;

impl MarketGate for AlwaysOpenGate {
    fn name(&self) -> &str {
        "AlwaysOpen"
    }

    fn is_open(&self) -> bool {
        true
    }
}
