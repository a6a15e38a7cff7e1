//! Splits one punch session into the portion belonging to one calendar date.
//!
//! A session can lie entirely inside the date, cross out of it over midnight,
//! cross into it from the previous day, or span the whole date. The recorded
//! work total is authoritative for the session; the wall clock only decides
//! how much of it lands on the target date.

use chrono::{NaiveDate, NaiveDateTime};

use crate::day::{proportional, start_of_day, start_of_next_day};
use crate::{DayContribution, PunchSession};

/// Portion of `session` attributable to `target_date`, or `None` when the
/// session has no overlap with the date (or contributes zero work to it).
///
/// A session without a punch-out is treated as ending at `now`.
pub fn split_for_date(
    session: &PunchSession,
    target_date: NaiveDate,
    now: NaiveDateTime,
) -> Option<DayContribution> {
    let start = session.start;
    let end = session.end.unwrap_or(now);

    let day_start = start_of_day(target_date);
    let day_end = start_of_next_day(target_date);

    if end <= day_start || start >= day_end {
        return None;
    }

    let recorded_work = session.recorded_work_seconds.max(0);
    let recorded_break = session.recorded_break_seconds.max(0);

    let starts_on_date = start >= day_start;
    let ends_on_date = end < day_end;

    let (work_seconds, window_start, window_end) = match (starts_on_date, ends_on_date) {
        // Fully inside the date: the recorder's totals apply as-is.
        (true, true) => (recorded_work, start, end),
        // Starts on the date, runs past midnight.
        (true, false) => {
            let until_midnight = (day_end - start).num_seconds();
            (until_midnight.min(recorded_work), start, day_end)
        }
        // Started the previous day, ends on the date.
        (false, true) => {
            let after_midnight = (end - day_start).num_seconds();
            (after_midnight.min(recorded_work), day_start, end)
        }
        // Spans the entire date.
        (false, false) => {
            let full_day = (day_end - day_start).num_seconds();
            (full_day.min(recorded_work), day_start, day_end)
        }
    };

    if work_seconds <= 0 {
        return None;
    }

    let break_seconds = if work_seconds >= recorded_work {
        recorded_break
    } else {
        proportional(recorded_break, work_seconds as f64 / recorded_work as f64)
    };

    Some(DayContribution {
        session_id: session.id.clone(),
        work_seconds,
        break_seconds,
        window_start,
        window_end,
    })
}
