//! Canonical week keys.

use chrono::{Datelike, Duration, NaiveDate};

/// The most recent Sunday on or before `date`. Every weekly record is keyed by it.
pub fn week_key(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Week key for the server's local calendar date.
pub fn current_week_key() -> NaiveDate {
    week_key(chrono::Local::now().date_naive())
}
