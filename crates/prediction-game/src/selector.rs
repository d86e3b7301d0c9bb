//! Start-Date Selection
//!
//! Picks the historical day a game begins on. The day must have at least a
//! week of trading history before it so the opening chart is not empty.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use market_data::DailyBar;
use rand::Rng;

use crate::session::HISTORY_DAYS;

/// Most recent day a random start may fall on, in days before today
pub const MIN_LOOKBACK_DAYS: i64 = 7;
/// Oldest day a random start may fall on, in days before today
pub const MAX_LOOKBACK_DAYS: i64 = 100;
/// Start used when neither the random pick nor the scan finds a usable record
pub const FALLBACK_LOOKBACK_DAYS: i64 = 30;
/// Records at the end of the series the linear scan never considers
const SCAN_TAIL: usize = 10;

/// Choose a start date for a new game.
///
/// Tries a uniformly random day between 100 and 7 days before
/// `reference_today` (moved back to a weekday), then the first weekday record
/// in that range with enough history, then finally 30 days back. The final
/// fallback is not checked against `series`; the session rejects it if the
/// record is missing.
///
/// Moving a weekend pick back to Friday can land a day or two before the
/// 100-day bound. That is accepted.
pub fn select_start_date<R: Rng + ?Sized>(
    series: &[DailyBar],
    reference_today: NaiveDate,
    rng: &mut R,
) -> NaiveDate {
    let candidate = walk_back_to_weekday(random_candidate(reference_today, rng));

    let index = series.iter().position(|bar| bar.date == candidate);
    if let Some(index) = index.filter(|&i| i >= HISTORY_DAYS) {
        tracing::debug!(%candidate, index, "Random start date found in series");
        return candidate;
    }

    let scan_end = series.len().saturating_sub(SCAN_TAIL);
    let scanned = series
        .iter()
        .take(scan_end)
        .skip(HISTORY_DAYS)
        .find(|bar| {
            let days_back = (reference_today - bar.date).num_days();
            bar.is_weekday() && (MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&days_back)
        });

    if let Some(bar) = scanned {
        tracing::debug!(%candidate, start = %bar.date, "Random start unusable, using scanned date");
        return bar.date;
    }

    let fallback =
        walk_back_to_weekday(reference_today - Duration::days(FALLBACK_LOOKBACK_DAYS));
    tracing::debug!(%candidate, %fallback, "No usable start in series, falling back");
    fallback
}

fn random_candidate<R: Rng + ?Sized>(reference_today: NaiveDate, rng: &mut R) -> NaiveDate {
    let earliest = reference_today - Duration::days(MAX_LOOKBACK_DAYS);
    // Both bounds are reachable calendar days
    let day_count = MAX_LOOKBACK_DAYS - MIN_LOOKBACK_DAYS + 1;

    let fraction: f64 = rng.gen();
    let offset_days = (fraction * day_count as f64).floor() as i64;

    earliest + Duration::days(offset_days)
}

pub(crate) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub(crate) fn walk_back_to_weekday(mut date: NaiveDate) -> NaiveDate {
    while is_weekend(date) {
        date = date - Duration::days(1);
    }
    date
}
