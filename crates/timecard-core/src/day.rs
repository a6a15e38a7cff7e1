//! Pure calendar-day arithmetic shared by the splitter and reconciler.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Local midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Local midnight at the start of the day after `date`.
pub fn start_of_next_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::days(1)
}

/// Overlap of `[start, end)` with `[lo, hi)`, or `None` when the intervals
/// are disjoint or the overlap is empty.
pub fn clamp_interval(
    start: NaiveDateTime,
    end: NaiveDateTime,
    lo: NaiveDateTime,
    hi: NaiveDateTime,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let clamped_start = start.max(lo);
    let clamped_end = end.min(hi);
    if clamped_start < clamped_end {
        Some((clamped_start, clamped_end))
    } else {
        None
    }
}

/// `floor(duration * fraction)`, clamped to `[0, duration]`.
pub fn proportional(duration: i64, fraction: f64) -> i64 {
    if duration <= 0 || fraction <= 0.0 {
        return 0;
    }
    let split = (duration as f64 * fraction).floor() as i64;
    split.min(duration)
}
