//! Export-row deserialization.
//!
//! The punch-clock and activity recorders export their tables as JSONL (one
//! row per line) or as plain JSON arrays. Field names follow the upstream
//! schemas: `punch_log_consolidated`, `inactivity_logs`, `web_logs`,
//! `application_logs`, and `company_employees`. Malformed rows are skipped,
//! never fatal; skip counts surface at debug level.

use chrono::{DateTime, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use crate::{EmployeeConfig, IdlePeriod, PunchSession, UsageEvent};

/// Accepted timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an export timestamp as naive local time.
///
/// Exported values are already in the target local time; a trailing `Z` or
/// UTC offset is exporter noise, so the clock reading is kept as written
/// rather than converted.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');

    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }

    // Offset-carrying form: keep the wall-clock reading, drop the offset.
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|parsed| parsed.naive_local())
}

/// Host part of a visited URL, lower-cased, without scheme/port/`www.`.
pub fn domain_from_url(url: &str) -> String {
    let without_scheme = match url.find("://") {
        Some(index) => &url[index + 3..],
        None => url,
    };
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);
    let host = host.split(':').next().unwrap_or(host);
    host.trim_start_matches("www.").to_ascii_lowercase()
}

/// One row of the consolidated punch log export.
#[derive(Debug, Clone, Deserialize)]
pub struct PunchRow {
    pub id: Option<i64>,
    pub username: String,
    pub punch_in_time: String,
    pub punch_out_time: Option<String>,
    pub total_work_duration_seconds: Option<i64>,
    pub break_duration_seconds: Option<i64>,
    pub system_name: Option<String>,
    pub company_name: Option<String>,
}

impl PunchRow {
    /// Convert to an engine session. `now` stands in for the missing totals
    /// of a still-open row.
    ///
    /// Rows without `total_work_duration_seconds` get it backfilled from
    /// wall clock minus the recorded break, which is what the upstream
    /// recorder writes on punch-out anyway.
    pub fn into_session(self, now: NaiveDateTime) -> Option<PunchSession> {
        let start = parse_timestamp(&self.punch_in_time)?;
        let end = match &self.punch_out_time {
            Some(raw) => Some(parse_timestamp(raw)?),
            None => None,
        };

        let recorded_break_seconds = self.break_duration_seconds.unwrap_or(0);
        let recorded_work_seconds = match self.total_work_duration_seconds {
            Some(seconds) => seconds,
            None => {
                let effective_end = end.unwrap_or(now);
                ((effective_end - start).num_seconds() - recorded_break_seconds.max(0)).max(0)
            }
        };

        let id = match self.id {
            Some(id) => id.to_string(),
            None => format!("{}-{}", self.username, start.format("%Y%m%d%H%M%S")),
        };

        Some(PunchSession {
            id,
            employee: self.username,
            start,
            end,
            recorded_work_seconds,
            recorded_break_seconds,
        })
    }
}

/// One row of the inactivity log export.
#[derive(Debug, Clone, Deserialize)]
pub struct InactivityRow {
    pub username: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration_seconds: Option<i64>,
    pub status: Option<String>,
}

impl InactivityRow {
    pub fn into_idle_period(self) -> Option<IdlePeriod> {
        let start = parse_timestamp(&self.start_time)?;

        let duration_seconds = match self.duration_seconds {
            Some(seconds) => seconds.max(0),
            None => {
                let end = parse_timestamp(self.end_time.as_deref()?)?;
                (end - start).num_seconds().max(0)
            }
        };

        Some(IdlePeriod {
            employee: self.username,
            start,
            duration_seconds,
        })
    }
}

/// One row of the web browsing log export.
#[derive(Debug, Clone, Deserialize)]
pub struct WebLogRow {
    pub username: String,
    pub website_url: String,
    pub visit_time: String,
    pub page_title: Option<String>,
    pub browser_name: Option<String>,
    pub category: Option<String>,
    pub duration_seconds: Option<i64>,
}

impl WebLogRow {
    pub fn into_usage_event(self) -> Option<UsageEvent> {
        let timestamp = parse_timestamp(&self.visit_time)?;
        Some(UsageEvent {
            employee: self.username,
            timestamp,
            key: domain_from_url(&self.website_url),
            duration_seconds: self.duration_seconds.unwrap_or(0).max(0),
        })
    }
}

/// One row of the application usage log export.
#[derive(Debug, Clone, Deserialize)]
pub struct AppLogRow {
    pub username: String,
    pub app_name: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub window_title: Option<String>,
    pub duration_seconds: Option<i64>,
}

impl AppLogRow {
    pub fn into_usage_event(self) -> Option<UsageEvent> {
        let timestamp = parse_timestamp(&self.start_time)?;

        let duration_seconds = match self.duration_seconds {
            Some(seconds) => seconds.max(0),
            None => {
                let end = parse_timestamp(self.end_time.as_deref()?)?;
                (end - timestamp).num_seconds().max(0)
            }
        };

        Some(UsageEvent {
            employee: self.username,
            timestamp,
            key: self.app_name,
            duration_seconds,
        })
    }
}

/// One row of the employee configuration export.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeRow {
    pub employee_id: String,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub lunch_duration: Option<i64>,
    pub significant_idle_threshold_minutes: Option<i64>,
    pub is_active: Option<bool>,
}

impl EmployeeRow {
    /// Accounting policy for this employee. The idle threshold never drops
    /// below 5 minutes; shorter gaps are ordinary typing pauses.
    pub fn config(&self) -> EmployeeConfig {
        let defaults = EmployeeConfig::default();
        EmployeeConfig {
            lunch_credit_minutes: self
                .lunch_duration
                .unwrap_or(defaults.lunch_credit_minutes)
                .max(0),
            significant_idle_threshold_minutes: self
                .significant_idle_threshold_minutes
                .unwrap_or(defaults.significant_idle_threshold_minutes)
                .max(5),
        }
    }
}

pub fn parse_punch_file(path: &Path, now: NaiveDateTime) -> Vec<PunchSession> {
    parse_rows::<PunchRow>(path)
        .into_iter()
        .filter_map(|row| row.into_session(now))
        .collect()
}

pub fn parse_inactivity_file(path: &Path) -> Vec<IdlePeriod> {
    parse_rows::<InactivityRow>(path)
        .into_iter()
        .filter_map(InactivityRow::into_idle_period)
        .collect()
}

pub fn parse_web_log_file(path: &Path) -> Vec<UsageEvent> {
    parse_rows::<WebLogRow>(path)
        .into_iter()
        .filter_map(WebLogRow::into_usage_event)
        .collect()
}

pub fn parse_app_log_file(path: &Path) -> Vec<UsageEvent> {
    parse_rows::<AppLogRow>(path)
        .into_iter()
        .filter_map(AppLogRow::into_usage_event)
        .collect()
}

pub fn parse_employee_file(path: &Path) -> Vec<EmployeeRow> {
    parse_rows::<EmployeeRow>(path)
}

/// Read one export file as either a JSON array or JSONL.
fn parse_rows<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };

    if raw.trim_start().starts_with('[') {
        return match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(rows) => rows,
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "unreadable export array");
                Vec::new()
            }
        };
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut bytes = trimmed.as_bytes().to_vec();
        match simd_json::from_slice::<T>(&mut bytes) {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(path = %path.display(), skipped, "skipped malformed export rows");
    }

    rows
}
