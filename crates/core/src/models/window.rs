use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::errors::CoreError;

/// A coarse reporting period used to select a window's start instant.
/// Stateless value object — never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    /// Since the start of the current calendar day.
    Day,
    /// Trailing 7 days.
    Week,
    /// Trailing 31 days.
    Month,
    /// Trailing 365 days.
    Year,
    /// Since January 1 of the current year.
    YearToDate,
    /// Entire recorded history.
    Max,
}

impl TimeWindow {
    /// The short code used in the UI and on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            TimeWindow::Day => "D",
            TimeWindow::Week => "W",
            TimeWindow::Month => "M",
            TimeWindow::Year => "Y",
            TimeWindow::YearToDate => "YTD",
            TimeWindow::Max => "MAX",
        }
    }

    /// Resolve the window to its cutoff instant relative to `now`.
    /// `None` means no cutoff (use the entire history).
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeWindow::Day => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc()),
            TimeWindow::Week => Some(now - Duration::days(7)),
            TimeWindow::Month => Some(now - Duration::days(31)),
            TimeWindow::Year => Some(now - Duration::days(365)),
            TimeWindow::YearToDate => NaiveDate::from_ymd_opt(now.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc()),
            TimeWindow::Max => None,
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for TimeWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "D" => Ok(TimeWindow::Day),
            "W" => Ok(TimeWindow::Week),
            "M" => Ok(TimeWindow::Month),
            "Y" => Ok(TimeWindow::Year),
            "YTD" => Ok(TimeWindow::YearToDate),
            "MAX" => Ok(TimeWindow::Max),
            other => Err(CoreError::ValidationError(format!(
                "Unknown window code '{other}' (expected D, W, M, Y, YTD, or MAX)"
            ))),
        }
    }
}
