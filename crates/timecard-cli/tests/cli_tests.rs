use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ── Fixture helpers ────────────────────────────────────────────────────────

/// Create a data directory with one standard working day for alice.
///
/// Layout:
///   <tmp>/punches.jsonl      alice 2025-03-10 09:00-18:00 (8h work, 60m break)
///   <tmp>/inactivity.jsonl   alice 15-minute idle at 14:00
///   <tmp>/web_logs.jsonl     three visits (github.com x2, docs.rs x1)
///   <tmp>/app_logs.jsonl     editor 40m, browser 20m
///   <tmp>/employees.json     alice with default 60/10 policy
fn create_fixture_dir() -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let base = tmp.path();

    let punches = r#"{"id": 1, "username": "alice", "punch_in_time": "2025-03-10T09:00:00", "punch_out_time": "2025-03-10T18:00:00", "total_work_duration_seconds": 28800, "break_duration_seconds": 3600}
{"id": 2, "username": "bob", "punch_in_time": "2025-03-10T10:00:00", "punch_out_time": "2025-03-10T16:00:00", "total_work_duration_seconds": 21600, "break_duration_seconds": 0}"#;
    fs::write(base.join("punches.jsonl"), punches).unwrap();

    let inactivity = r#"{"username": "alice", "start_time": "2025-03-10T14:00:00", "duration_seconds": 900, "status": "idle"}"#;
    fs::write(base.join("inactivity.jsonl"), inactivity).unwrap();

    let web_logs = r#"{"username": "alice", "website_url": "https://www.github.com/pulls", "visit_time": "2025-03-10T10:00:00", "duration_seconds": 300}
{"username": "alice", "website_url": "https://github.com/issues", "visit_time": "2025-03-10T11:00:00", "duration_seconds": 120}
{"username": "alice", "website_url": "https://docs.rs/chrono", "visit_time": "2025-03-10T12:00:00", "duration_seconds": 60}"#;
    fs::write(base.join("web_logs.jsonl"), web_logs).unwrap();

    let app_logs = r#"{"username": "alice", "app_name": "Code", "start_time": "2025-03-10T09:00:00", "duration_seconds": 2400, "window_title": "main.rs"}
{"username": "alice", "app_name": "Firefox", "start_time": "2025-03-10T10:00:00", "duration_seconds": 1200, "window_title": "docs"}"#;
    fs::write(base.join("app_logs.jsonl"), app_logs).unwrap();

    let employees = r#"[{"employee_id": "alice", "full_name": "Alice Doe", "lunch_duration": 60, "significant_idle_threshold_minutes": 10}]"#;
    fs::write(base.join("employees.json"), employees).unwrap();

    tmp
}

/// Data directory with a single midnight-crossing session for alice.
fn create_midnight_fixture_dir() -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let punches = r#"{"id": 9, "username": "alice", "punch_in_time": "2025-03-10T22:00:00", "punch_out_time": "2025-03-11T02:00:00", "total_work_duration_seconds": 14400, "break_duration_seconds": 0}"#;
    fs::write(tmp.path().join("punches.jsonl"), punches).unwrap();
    tmp
}

fn cmd_with_dir(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("timecard").unwrap();
    cmd.arg("--dir").arg(dir);
    cmd
}

// ── Basic invocation ───────────────────────────────────────────────────────

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("timecard").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Employee working-hours analytics"));
}

#[test]
fn test_daily_requires_employee_and_date() {
    let mut cmd = Command::cargo_bin("timecard").unwrap();
    cmd.arg("daily").assert().failure();
}

#[test]
fn test_invalid_date_is_rejected() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["daily", "--employee", "alice", "--date", "10-03-2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn test_missing_data_dir_is_reported() {
    let mut cmd = Command::cargo_bin("timecard").unwrap();
    cmd.args([
        "--dir",
        "/nonexistent/timecard-data",
        "daily",
        "--employee",
        "alice",
        "--date",
        "2025-03-10",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("does not exist"));
}

// ── Daily report ───────────────────────────────────────────────────────────

#[test]
fn test_daily_json_metrics() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["daily", "--employee", "alice", "--date", "2025-03-10", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalWorkHours\": 8.0"))
        .stdout(predicate::str::contains("\"totalBreakMinutes\": 60.0"))
        .stdout(predicate::str::contains("\"significantIdleMinutes\": 15.0"))
        // 8h - 1h break - 15m idle = 6.75h actual, +60m lunch credit = 7.75h.
        .stdout(predicate::str::contains("\"actualWorkingHours\": 6.75"))
        .stdout(predicate::str::contains("\"finalWorkingHours\": 7.75"))
        .stdout(predicate::str::contains("\"sessionCount\": 1"))
        .stdout(predicate::str::contains("\"firstPunchIn\": \"09:00\""))
        .stdout(predicate::str::contains("\"lastPunchOut\": \"18:00\""));
}

#[test]
fn test_daily_json_ignores_other_employees() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["daily", "--employee", "bob", "--date", "2025-03-10", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalWorkHours\": 6.0"))
        .stdout(predicate::str::contains("\"significantIdleMinutes\": 0.0"));
}

#[test]
fn test_daily_table_output() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["daily", "--employee", "alice", "--date", "2025-03-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily hours for alice on 2025-03-10"))
        .stdout(predicate::str::contains("10/03/2025 09:00"))
        .stdout(predicate::str::contains("8.00h"));
}

#[test]
fn test_daily_empty_date_yields_zeroes() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["daily", "--employee", "alice", "--date", "2025-03-11", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalWorkHours\": 0.0"))
        .stdout(predicate::str::contains("\"sessionCount\": 0"));
}

#[test]
fn test_daily_rejects_malformed_punch_order() {
    let tmp = TempDir::new().unwrap();
    let punches = r#"{"id": 5, "username": "alice", "punch_in_time": "2025-03-10T18:00:00", "punch_out_time": "2025-03-10T09:00:00", "total_work_duration_seconds": 28800, "break_duration_seconds": 0}"#;
    fs::write(tmp.path().join("punches.jsonl"), punches).unwrap();

    cmd_with_dir(tmp.path())
        .args(["daily", "--employee", "alice", "--date", "2025-03-10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session 5"));
}

// ── Range report ───────────────────────────────────────────────────────────

#[test]
fn test_range_json_splits_midnight_session() {
    let tmp = create_midnight_fixture_dir();
    cmd_with_dir(tmp.path())
        .args([
            "range",
            "--employee",
            "alice",
            "--since",
            "2025-03-10",
            "--until",
            "2025-03-11",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"date\": \"2025-03-10\""))
        .stdout(predicate::str::contains("\"date\": \"2025-03-11\""))
        // 22:00-02:00 splits into 2h on each side of midnight.
        .stdout(predicate::str::contains("\"totalWorkHours\": 2.0").count(2));
}

#[test]
fn test_range_rejects_inverted_window() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args([
            "range",
            "--employee",
            "alice",
            "--since",
            "2025-03-12",
            "--until",
            "2025-03-10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--until"));
}

// ── Usage reports ──────────────────────────────────────────────────────────

#[test]
fn test_domains_ranked_by_visits() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["domains", "--employee", "alice", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key\": \"github.com\""))
        .stdout(predicate::str::contains("\"key\": \"docs.rs\""))
        .stdout(predicate::str::contains("\"totalEvents\": 3"));
}

#[test]
fn test_apps_ranked_by_duration() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["apps", "--employee", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Code"))
        .stdout(predicate::str::contains("40m"))
        .stdout(predicate::str::contains("Total: 1h 0m"));
}

#[test]
fn test_apps_top_limits_rows() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["apps", "--employee", "alice", "--top", "1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Code"))
        .stdout(predicate::str::contains("Firefox").not());
}

// ── Sources ────────────────────────────────────────────────────────────────

#[test]
fn test_sources_counts_export_files() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["sources", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"punchFiles\": 1"))
        .stdout(predicate::str::contains("\"webFiles\": 1"))
        .stdout(predicate::str::contains("\"totalFiles\": 5"));
}

#[test]
fn test_sources_table_output() {
    let tmp = create_fixture_dir();
    cmd_with_dir(tmp.path())
        .args(["sources"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Punch logs:       1"))
        .stdout(predicate::str::contains("Total: 5 export files"));
}
