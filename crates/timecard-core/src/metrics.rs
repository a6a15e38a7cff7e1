//! Daily metrics aggregation: drives the day-splitter and idle reconciler
//! and folds the results into the reportable working-hours figures.

use chrono::{NaiveDate, NaiveDateTime};
use rayon::prelude::*;

use crate::idle::significant_idle_seconds;
use crate::splitter::split_for_date;
use crate::{
    DailyMetrics, DailyReport, DayContribution, EmployeeConfig, IdlePeriod, PunchSession,
    ValidationError,
};

/// Computes one calendar day's working-hours metrics for one employee.
///
/// Sessions that do not touch `target_date` are ignored; a session with no
/// punch-out is treated as ending at `now`. Malformed sessions (punch-out
/// before punch-in, negative recorded durations) fail the whole computation
/// so bad recorder data never dilutes a report silently.
pub fn compute_daily_metrics(
    sessions: &[PunchSession],
    idle_periods: &[IdlePeriod],
    config: &EmployeeConfig,
    target_date: NaiveDate,
    now: NaiveDateTime,
) -> Result<DailyReport, ValidationError> {
    validate_sessions(sessions)?;

    let contributions: Vec<DayContribution> = sessions
        .iter()
        .filter_map(|session| split_for_date(session, target_date, now))
        .collect();

    let work_seconds: i64 = contributions.iter().map(|c| c.work_seconds).sum();
    let break_seconds: i64 = contributions.iter().map(|c| c.break_seconds).sum();

    let total_work_hours = work_seconds as f64 / 3600.0;
    let total_break_minutes = break_seconds as f64 / 60.0;

    let idle_seconds = significant_idle_seconds(
        idle_periods,
        &contributions,
        config.significant_idle_threshold_minutes,
        target_date,
    );
    let significant_idle_minutes = idle_seconds as f64 / 60.0;

    let actual_working_hours =
        (total_work_hours - total_break_minutes / 60.0 - significant_idle_minutes / 60.0).max(0.0);
    let final_working_hours = actual_working_hours + config.lunch_credit_minutes as f64 / 60.0;

    let productivity_percent = if total_work_hours > 0.0 {
        actual_working_hours / total_work_hours * 100.0
    } else {
        0.0
    };

    let first_punch_in = contributions.iter().map(|c| c.window_start).min();
    let last_punch_out = contributions.iter().map(|c| c.window_end).max();

    Ok(DailyReport {
        date: target_date,
        metrics: DailyMetrics {
            total_work_hours,
            total_break_minutes,
            significant_idle_minutes,
            actual_working_hours,
            final_working_hours,
            sessions_on_date: contributions.len() as i32,
            first_punch_in,
            last_punch_out,
            productivity_percent,
        },
        contributions,
    })
}

/// Metrics for every date in the inclusive `[since, until]` window.
///
/// Days without any contribution still produce a (zeroed) entry so callers
/// can render sparse ranges without gap bookkeeping.
pub fn compute_range_metrics(
    sessions: &[PunchSession],
    idle_periods: &[IdlePeriod],
    config: &EmployeeConfig,
    since: NaiveDate,
    until: NaiveDate,
    now: NaiveDateTime,
) -> Result<Vec<DailyReport>, ValidationError> {
    validate_sessions(sessions)?;

    let mut dates = Vec::new();
    let mut date = since;
    while date <= until {
        dates.push(date);
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    dates
        .par_iter()
        .map(|d| compute_daily_metrics(sessions, idle_periods, config, *d, now))
        .collect()
}

fn validate_sessions(sessions: &[PunchSession]) -> Result<(), ValidationError> {
    for session in sessions {
        if let Some(end) = session.end {
            if end < session.start {
                return Err(ValidationError::EndBeforeStart {
                    id: session.id.clone(),
                    start: session.start,
                    end,
                });
            }
        }
        if session.recorded_work_seconds < 0 || session.recorded_break_seconds < 0 {
            return Err(ValidationError::NegativeDuration {
                id: session.id.clone(),
            });
        }
    }
    Ok(())
}
