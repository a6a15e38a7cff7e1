//! Reconciles detected idle periods against the day's punch windows.
//!
//! Idle time only counts against working time while the employee was clocked
//! in. An idle period that starts inside a punch window but runs past the
//! punch-out is clipped to the window, and the clipped remainder must itself
//! still meet the significance threshold.

use chrono::NaiveDate;

use crate::day::clamp_interval;
use crate::{DayContribution, IdlePeriod};

/// Total seconds of significant idle time that fall inside the punch windows
/// of `contributions` on `target_date`.
///
/// An idle period is counted against at most one window; windows for one
/// employee are expected to be non-overlapping.
pub fn significant_idle_seconds(
    idle_periods: &[IdlePeriod],
    contributions: &[DayContribution],
    threshold_minutes: i64,
    target_date: NaiveDate,
) -> i64 {
    let threshold_seconds = threshold_minutes * 60;
    let mut total = 0i64;

    for idle in idle_periods {
        if idle.duration_seconds < threshold_seconds {
            continue;
        }
        // Only idle periods that begin on the target date participate, even
        // if a window from an adjacent day would overlap them.
        if idle.start.date() != target_date {
            continue;
        }

        let idle_end = idle.end();
        for contribution in contributions {
            let starts_within = idle.start >= contribution.window_start
                && idle.start < contribution.window_end;
            if !starts_within {
                continue;
            }

            if let Some((clipped_start, clipped_end)) = clamp_interval(
                idle.start,
                idle_end,
                contribution.window_start,
                contribution.window_end,
            ) {
                let clipped = (clipped_end - clipped_start).num_seconds();
                if clipped >= idle.duration_seconds {
                    total += idle.duration_seconds;
                } else if clipped >= threshold_seconds {
                    // Partially outside the window: the in-window remainder
                    // must re-qualify on its own.
                    total += clipped;
                }
            }
            break;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    fn idle(start: NaiveDateTime, minutes: i64) -> IdlePeriod {
        IdlePeriod {
            employee: "alice".to_string(),
            start,
            duration_seconds: minutes * 60,
        }
    }

    fn window(start: NaiveDateTime, end: NaiveDateTime) -> DayContribution {
        DayContribution {
            session_id: "s1".to_string(),
            work_seconds: (end - start).num_seconds(),
            break_seconds: 0,
            window_start: start,
            window_end: end,
        }
    }

    fn day() -> NaiveDate {
        date(2025, 3, 10)
    }

    #[test]
    fn test_idle_inside_window_counts_in_full() {
        let windows = vec![window(dt(2025, 3, 10, 9, 0), dt(2025, 3, 10, 18, 0))];
        let idles = vec![idle(dt(2025, 3, 10, 14, 0), 15)];

        assert_eq!(significant_idle_seconds(&idles, &windows, 10, day()), 15 * 60);
    }

    #[test]
    fn test_idle_below_threshold_ignored() {
        let windows = vec![window(dt(2025, 3, 10, 9, 0), dt(2025, 3, 10, 18, 0))];
        let idles = vec![idle(dt(2025, 3, 10, 14, 0), 9)];

        assert_eq!(significant_idle_seconds(&idles, &windows, 10, day()), 0);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let windows = vec![window(dt(2025, 3, 10, 9, 0), dt(2025, 3, 10, 18, 0))];

        let exactly = vec![idle(dt(2025, 3, 10, 14, 0), 10)];
        assert_eq!(significant_idle_seconds(&exactly, &windows, 10, day()), 600);

        let one_second_short = vec![IdlePeriod {
            employee: "alice".to_string(),
            start: dt(2025, 3, 10, 14, 0),
            duration_seconds: 599,
        }];
        assert_eq!(significant_idle_seconds(&one_second_short, &windows, 10, day()), 0);
    }

    #[test]
    fn test_idle_before_punch_in_excluded() {
        let windows = vec![window(dt(2025, 3, 10, 9, 0), dt(2025, 3, 10, 18, 0))];
        let idles = vec![idle(dt(2025, 3, 10, 7, 0), 30)];

        assert_eq!(significant_idle_seconds(&idles, &windows, 10, day()), 0);
    }

    #[test]
    fn test_idle_after_punch_out_excluded() {
        let windows = vec![window(dt(2025, 3, 10, 9, 0), dt(2025, 3, 10, 18, 0))];
        let idles = vec![idle(dt(2025, 3, 10, 19, 0), 30)];

        assert_eq!(significant_idle_seconds(&idles, &windows, 10, day()), 0);
    }

    #[test]
    fn test_idle_clipped_at_punch_out_when_remainder_qualifies() {
        // 20:00-20:25 idle against a window closing at 20:10: ten in-window
        // minutes survive, which still meets the 10-minute threshold.
        let windows = vec![window(dt(2025, 3, 10, 9, 0), dt(2025, 3, 10, 20, 10))];
        let idles = vec![idle(dt(2025, 3, 10, 20, 0), 25)];

        assert_eq!(significant_idle_seconds(&idles, &windows, 10, day()), 600);
    }

    #[test]
    fn test_clipped_remainder_below_threshold_dropped() {
        // Only 5 of the 25 idle minutes fall inside the window.
        let windows = vec![window(dt(2025, 3, 10, 9, 0), dt(2025, 3, 10, 20, 5))];
        let idles = vec![idle(dt(2025, 3, 10, 20, 0), 25)];

        assert_eq!(significant_idle_seconds(&idles, &windows, 10, day()), 0);
    }

    #[test]
    fn test_idle_starting_on_other_date_excluded() {
        // Window crosses in from the previous day; idle started yesterday.
        let windows = vec![window(dt(2025, 3, 10, 0, 0), dt(2025, 3, 10, 6, 0))];
        let idles = vec![idle(dt(2025, 3, 9, 23, 50), 30)];

        assert_eq!(significant_idle_seconds(&idles, &windows, 10, day()), 0);
    }

    #[test]
    fn test_idle_counted_against_single_window_only() {
        // Back-to-back windows; the idle starts in the first and must not be
        // double counted against the second.
        let windows = vec![
            window(dt(2025, 3, 10, 9, 0), dt(2025, 3, 10, 12, 0)),
            window(dt(2025, 3, 10, 12, 0), dt(2025, 3, 10, 18, 0)),
        ];
        let idles = vec![idle(dt(2025, 3, 10, 11, 45), 15)];

        assert_eq!(significant_idle_seconds(&idles, &windows, 10, day()), 15 * 60);
    }

    #[test]
    fn test_multiple_idle_periods_accumulate() {
        let windows = vec![window(dt(2025, 3, 10, 9, 0), dt(2025, 3, 10, 18, 0))];
        let idles = vec![
            idle(dt(2025, 3, 10, 10, 0), 12),
            idle(dt(2025, 3, 10, 15, 0), 20),
            idle(dt(2025, 3, 10, 16, 0), 5),
        ];

        assert_eq!(significant_idle_seconds(&idles, &windows, 10, day()), (12 + 20) * 60);
    }
}
