#![deny(clippy::all)]

mod day;
mod idle;
mod metrics;
mod splitter;
mod usage;

pub mod records;
pub mod scanner;

pub use day::{clamp_interval, proportional, start_of_day, start_of_next_day};
pub use idle::significant_idle_seconds;
pub use metrics::{compute_daily_metrics, compute_range_metrics};
pub use splitter::split_for_date;
pub use usage::{top_applications, top_domains, top_n};

use chrono::{Local, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Environment variable consulted when no data directory is given explicitly.
pub const DATA_DIR_ENV: &str = "TIMECARD_DATA_DIR";

const DEFAULT_DATA_DIR: &str = "timecard-data";

/// One continuous clock-in/clock-out record for an employee.
///
/// `recorded_work_seconds` and `recorded_break_seconds` are the recorder's
/// authoritative totals for the whole session. They may disagree with the
/// wall-clock delta between `start` and `end`; the day-splitter trusts them.
#[derive(Debug, Clone)]
pub struct PunchSession {
    pub id: String,
    pub employee: String,
    pub start: NaiveDateTime,
    /// Absent means still clocked in; computations substitute "now".
    pub end: Option<NaiveDateTime>,
    pub recorded_work_seconds: i64,
    pub recorded_break_seconds: i64,
}

/// One detected inactivity window.
#[derive(Debug, Clone)]
pub struct IdlePeriod {
    pub employee: String,
    pub start: NaiveDateTime,
    pub duration_seconds: i64,
}

impl IdlePeriod {
    pub fn end(&self) -> NaiveDateTime {
        self.start + chrono::Duration::seconds(self.duration_seconds)
    }
}

/// Per-employee accounting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct EmployeeConfig {
    pub lunch_credit_minutes: i64,
    pub significant_idle_threshold_minutes: i64,
}

impl Default for EmployeeConfig {
    fn default() -> Self {
        Self {
            lunch_credit_minutes: 60,
            significant_idle_threshold_minutes: 10,
        }
    }
}

/// The portion of one punch session attributable to one calendar date.
///
/// `window_start`/`window_end` are the punch instants clamped to the date so
/// idle reconciliation never has to re-derive midnight boundaries.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DayContribution {
    pub session_id: String,
    pub work_seconds: i64,
    pub break_seconds: i64,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
}

/// Working-hours figures for one employee on one calendar date.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DailyMetrics {
    pub total_work_hours: f64,
    pub total_break_minutes: f64,
    pub significant_idle_minutes: f64,
    pub actual_working_hours: f64,
    pub final_working_hours: f64,
    pub sessions_on_date: i32,
    pub first_punch_in: Option<NaiveDateTime>,
    pub last_punch_out: Option<NaiveDateTime>,
    pub productivity_percent: f64,
}

/// Metrics for one date plus the per-session contributions behind them.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub metrics: DailyMetrics,
    pub contributions: Vec<DayContribution>,
}

/// One timestamped usage event: a domain visit or an application window.
#[derive(Debug, Clone)]
pub struct UsageEvent {
    pub employee: String,
    pub timestamp: NaiveDateTime,
    pub key: String,
    pub duration_seconds: i64,
}

/// One ranked row of a usage report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UsageTotal {
    pub key: String,
    pub total: i64,
    pub events: i32,
}

/// Caller contract violations in the input records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("session {id}: punch-out {end} is earlier than punch-in {start}")]
    EndBeforeStart {
        id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("session {id}: negative recorded work or break duration")]
    NegativeDuration { id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("data directory {} does not exist", .0.display())]
    DataDirMissing(PathBuf),
    #[error("missing required option: {0}")]
    MissingOption(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub data_dir: Option<String>,
    pub employee: Option<String>,
    pub date: Option<NaiveDate>,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub top: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    Domains,
    Applications,
}

/// Everything loaded from one data directory.
#[derive(Debug, Default)]
pub struct RecordSet {
    pub sessions: Vec<PunchSession>,
    pub idle_periods: Vec<IdlePeriod>,
    pub web_events: Vec<UsageEvent>,
    pub app_events: Vec<UsageEvent>,
    pub employees: Vec<records::EmployeeRow>,
}

impl RecordSet {
    /// Accounting policy for one employee, falling back to the defaults
    /// (60-minute lunch credit, 10-minute idle threshold) when the employee
    /// has no configuration row.
    pub fn config_for(&self, employee: &str) -> EmployeeConfig {
        self.employees
            .iter()
            .find(|row| row.employee_id == employee)
            .map(records::EmployeeRow::config)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DailyHoursReport {
    pub employee: String,
    pub config: EmployeeConfig,
    pub report: DailyReport,
    pub processing_time_ms: u32,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RangeHoursReport {
    pub employee: String,
    pub config: EmployeeConfig,
    pub entries: Vec<DailyReport>,
    pub processing_time_ms: u32,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct UsageReport {
    pub entries: Vec<UsageTotal>,
    pub total: i64,
    pub total_events: i32,
    pub processing_time_ms: u32,
}

/// Resolve the export data directory: explicit option, then the
/// `TIMECARD_DATA_DIR` environment variable, then `./timecard-data`.
pub fn resolve_data_dir(option: &Option<String>) -> Result<PathBuf, EngineError> {
    let dir = option
        .clone()
        .or_else(|| std::env::var(DATA_DIR_ENV).ok())
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    let path = PathBuf::from(dir);
    if !path.is_dir() {
        return Err(EngineError::DataDirMissing(path));
    }
    Ok(path)
}

/// Scan the data directory and load every export file into memory.
///
/// `now` closes still-open punch rows, so one captured instant is shared by
/// everything loaded for a report.
pub fn load_records(data_dir: &Path, now: NaiveDateTime) -> RecordSet {
    let scan = scanner::scan_data_dir(data_dir);

    let sessions: Vec<PunchSession> = scan
        .punch_files
        .par_iter()
        .flat_map(|path| records::parse_punch_file(path, now))
        .collect();

    let idle_periods: Vec<IdlePeriod> = scan
        .inactivity_files
        .par_iter()
        .flat_map(|path| records::parse_inactivity_file(path))
        .collect();

    let web_events: Vec<UsageEvent> = scan
        .web_files
        .par_iter()
        .flat_map(|path| records::parse_web_log_file(path))
        .collect();

    let app_events: Vec<UsageEvent> = scan
        .app_files
        .par_iter()
        .flat_map(|path| records::parse_app_log_file(path))
        .collect();

    let employees: Vec<records::EmployeeRow> = scan
        .employee_files
        .iter()
        .flat_map(|path| records::parse_employee_file(path))
        .collect();

    RecordSet {
        sessions,
        idle_periods,
        web_events,
        app_events,
        employees,
    }
}

/// Working-hours report for one employee on one date.
pub fn get_daily_report(options: ReportOptions) -> Result<DailyHoursReport, EngineError> {
    let start = Instant::now();

    let employee = options
        .employee
        .clone()
        .ok_or(EngineError::MissingOption("employee"))?;
    let date = options.date.ok_or(EngineError::MissingOption("date"))?;
    let data_dir = resolve_data_dir(&options.data_dir)?;

    let now = Local::now().naive_local();
    let set = load_records(&data_dir, now);

    let sessions = sessions_for(&set, &employee);
    let idle_periods = idle_for(&set, &employee);
    let config = set.config_for(&employee);

    let report = compute_daily_metrics(&sessions, &idle_periods, &config, date, now)?;

    Ok(DailyHoursReport {
        employee,
        config,
        report,
        processing_time_ms: start.elapsed().as_millis() as u32,
    })
}

/// Per-day working-hours reports for one employee over an inclusive window.
pub fn get_range_report(options: ReportOptions) -> Result<RangeHoursReport, EngineError> {
    let start = Instant::now();

    let employee = options
        .employee
        .clone()
        .ok_or(EngineError::MissingOption("employee"))?;
    let since = options.since.ok_or(EngineError::MissingOption("since"))?;
    let until = options.until.ok_or(EngineError::MissingOption("until"))?;
    let data_dir = resolve_data_dir(&options.data_dir)?;

    let now = Local::now().naive_local();
    let set = load_records(&data_dir, now);

    let sessions = sessions_for(&set, &employee);
    let idle_periods = idle_for(&set, &employee);
    let config = set.config_for(&employee);

    let entries = compute_range_metrics(&sessions, &idle_periods, &config, since, until, now)?;

    Ok(RangeHoursReport {
        employee,
        config,
        entries,
        processing_time_ms: start.elapsed().as_millis() as u32,
    })
}

/// Ranked top-N usage report over domain visits or application time.
pub fn get_usage_report(options: ReportOptions, kind: UsageKind) -> Result<UsageReport, EngineError> {
    let start = Instant::now();

    let data_dir = resolve_data_dir(&options.data_dir)?;

    let now = Local::now().naive_local();
    let set = load_records(&data_dir, now);

    let events = match kind {
        UsageKind::Domains => &set.web_events,
        UsageKind::Applications => &set.app_events,
    };

    let filtered: Vec<UsageEvent> = events
        .iter()
        .filter(|e| match &options.employee {
            Some(employee) => e.employee == *employee,
            None => true,
        })
        .filter(|e| match options.since {
            Some(since) => e.timestamp.date() >= since,
            None => true,
        })
        .filter(|e| match options.until {
            Some(until) => e.timestamp.date() <= until,
            None => true,
        })
        .cloned()
        .collect();

    let top = options.top.unwrap_or(10);
    let entries = match kind {
        UsageKind::Domains => top_domains(&filtered, top),
        UsageKind::Applications => top_applications(&filtered, top),
    };

    let total = entries.iter().map(|e| e.total).sum();
    let total_events = entries.iter().map(|e| e.events).sum();

    Ok(UsageReport {
        entries,
        total,
        total_events,
        processing_time_ms: start.elapsed().as_millis() as u32,
    })
}

fn sessions_for(set: &RecordSet, employee: &str) -> Vec<PunchSession> {
    set.sessions
        .iter()
        .filter(|s| s.employee == employee)
        .cloned()
        .collect()
}

fn idle_for(set: &RecordSet, employee: &str) -> Vec<IdlePeriod> {
    set.idle_periods
        .iter()
        .filter(|p| p.employee == employee)
        .cloned()
        .collect()
}
