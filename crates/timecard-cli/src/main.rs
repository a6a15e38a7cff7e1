use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use timecard_core::{ReportOptions, UsageKind};

#[derive(Parser)]
#[command(name = "timecard")]
#[command(author, version, about = "Employee working-hours analytics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Data directory containing recorder exports")]
    dir: Option<String>,

    #[arg(long, global = true, help = "Enable debug logging")]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show daily working hours for an employee")]
    Daily {
        #[arg(long, help = "Employee id (recorder username)")]
        employee: String,
        #[arg(long, help = "Target date (YYYY-MM-DD)")]
        date: String,
        #[arg(long, help = "Output as JSON")]
        json: bool,
        #[arg(long, help = "Show processing time")]
        benchmark: bool,
    },
    #[command(about = "Show per-day working hours over a date range")]
    Range {
        #[arg(long, help = "Employee id (recorder username)")]
        employee: String,
        #[arg(long, help = "Start date (YYYY-MM-DD)")]
        since: String,
        #[arg(long, help = "End date (YYYY-MM-DD)")]
        until: String,
        #[arg(long, help = "Output as JSON")]
        json: bool,
        #[arg(long, help = "Show processing time")]
        benchmark: bool,
    },
    #[command(about = "Show top applications by foreground time")]
    Apps {
        #[arg(long, help = "Restrict to one employee")]
        employee: Option<String>,
        #[arg(long, help = "Start date (YYYY-MM-DD)")]
        since: Option<String>,
        #[arg(long, help = "End date (YYYY-MM-DD)")]
        until: Option<String>,
        #[arg(long, default_value = "10", help = "Number of rows")]
        top: usize,
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Show top visited domains by visit count")]
    Domains {
        #[arg(long, help = "Restrict to one employee")]
        employee: Option<String>,
        #[arg(long, help = "Start date (YYYY-MM-DD)")]
        since: Option<String>,
        #[arg(long, help = "End date (YYYY-MM-DD)")]
        until: Option<String>,
        #[arg(long, default_value = "10", help = "Number of rows")]
        top: usize,
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Show discovered export files in the data directory")]
    Sources {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    }

    match cli.command {
        Commands::Daily {
            employee,
            date,
            json,
            benchmark,
        } => run_daily_report(cli.dir, employee, &date, json, benchmark),
        Commands::Range {
            employee,
            since,
            until,
            json,
            benchmark,
        } => run_range_report(cli.dir, employee, &since, &until, json, benchmark),
        Commands::Apps {
            employee,
            since,
            until,
            top,
            json,
        } => run_usage_report(
            cli.dir,
            UsageKind::Applications,
            employee,
            since,
            until,
            top,
            json,
        ),
        Commands::Domains {
            employee,
            since,
            until,
            top,
            json,
        } => run_usage_report(cli.dir, UsageKind::Domains, employee, since, until, top, json),
        Commands::Sources { json } => run_sources_command(cli.dir, json),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("invalid date '{raw}', expected YYYY-MM-DD"))
}

fn run_daily_report(
    dir: Option<String>,
    employee: String,
    date: &str,
    json: bool,
    benchmark: bool,
) -> Result<()> {
    use timecard_core::get_daily_report;

    let date = parse_date(date)?;
    let report = get_daily_report(ReportOptions {
        data_dir: dir,
        employee: Some(employee),
        date: Some(date),
        ..ReportOptions::default()
    })?;

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SessionJson {
            session_id: String,
            punch_in: String,
            punch_out: String,
            work_hours: f64,
            break_minutes: f64,
        }

        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct DailyJson {
            employee: String,
            date: String,
            total_work_hours: f64,
            total_break_minutes: f64,
            significant_idle_minutes: f64,
            actual_working_hours: f64,
            final_working_hours: f64,
            session_count: i32,
            first_punch_in: Option<String>,
            last_punch_out: Option<String>,
            productivity_percent: f64,
            sessions: Vec<SessionJson>,
            processing_time_ms: u32,
        }

        let m = &report.report.metrics;
        let output = DailyJson {
            employee: report.employee.clone(),
            date: report.report.date.to_string(),
            total_work_hours: m.total_work_hours,
            total_break_minutes: m.total_break_minutes,
            significant_idle_minutes: m.significant_idle_minutes,
            actual_working_hours: m.actual_working_hours,
            final_working_hours: m.final_working_hours,
            session_count: m.sessions_on_date,
            first_punch_in: m.first_punch_in.map(format_time),
            last_punch_out: m.last_punch_out.map(format_time),
            productivity_percent: m.productivity_percent,
            sessions: report
                .report
                .contributions
                .iter()
                .map(|c| SessionJson {
                    session_id: c.session_id.clone(),
                    punch_in: format_date_time(c.window_start),
                    punch_out: format_date_time(c.window_end),
                    work_hours: c.work_seconds as f64 / 3600.0,
                    break_minutes: c.break_seconds as f64 / 60.0,
                })
                .collect(),
            processing_time_ms: report.processing_time_ms,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        use comfy_table::{ContentArrangement, Table};

        let m = &report.report.metrics;

        println!(
            "\nDaily hours for {} on {}\n",
            report.employee, report.report.date
        );

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Session", "Punch In", "Punch Out", "Work", "Break"]);

        for c in &report.report.contributions {
            table.add_row(vec![
                c.session_id.clone(),
                format_date_time(c.window_start),
                format_date_time(c.window_end),
                format_hours(c.work_seconds as f64 / 3600.0),
                format_minutes(c.break_seconds as f64 / 60.0),
            ]);
        }

        println!("{table}");
        println!(
            "\nWork: {} | Break: {} | Idle: {} | Actual: {} | Final: {}",
            format_hours(m.total_work_hours),
            format_minutes(m.total_break_minutes),
            format_minutes(m.significant_idle_minutes),
            format_hours(m.actual_working_hours),
            format_hours(m.final_working_hours),
        );
        println!(
            "First in: {} | Last out: {} | Productivity: {:.1}%",
            m.first_punch_in.map_or_else(|| "N/A".to_string(), format_time),
            m.last_punch_out.map_or_else(|| "N/A".to_string(), format_time),
            m.productivity_percent,
        );

        if benchmark {
            print_benchmark(report.processing_time_ms);
        }
    }

    Ok(())
}

fn run_range_report(
    dir: Option<String>,
    employee: String,
    since: &str,
    until: &str,
    json: bool,
    benchmark: bool,
) -> Result<()> {
    use timecard_core::get_range_report;

    let since = parse_date(since)?;
    let until = parse_date(until)?;
    if until < since {
        anyhow::bail!("--until must not be earlier than --since");
    }

    let report = get_range_report(ReportOptions {
        data_dir: dir,
        employee: Some(employee),
        since: Some(since),
        until: Some(until),
        ..ReportOptions::default()
    })?;

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct DayJson {
            date: String,
            total_work_hours: f64,
            total_break_minutes: f64,
            significant_idle_minutes: f64,
            actual_working_hours: f64,
            final_working_hours: f64,
            session_count: i32,
            productivity_percent: f64,
        }

        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct RangeJson {
            employee: String,
            entries: Vec<DayJson>,
            processing_time_ms: u32,
        }

        let output = RangeJson {
            employee: report.employee.clone(),
            entries: report
                .entries
                .iter()
                .map(|day| DayJson {
                    date: day.date.to_string(),
                    total_work_hours: day.metrics.total_work_hours,
                    total_break_minutes: day.metrics.total_break_minutes,
                    significant_idle_minutes: day.metrics.significant_idle_minutes,
                    actual_working_hours: day.metrics.actual_working_hours,
                    final_working_hours: day.metrics.final_working_hours,
                    session_count: day.metrics.sessions_on_date,
                    productivity_percent: day.metrics.productivity_percent,
                })
                .collect(),
            processing_time_ms: report.processing_time_ms,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        use comfy_table::{ContentArrangement, Table};

        println!("\nWorking hours for {}\n", report.employee);

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            "Date",
            "Work",
            "Break",
            "Idle",
            "Actual",
            "Final",
            "Sessions",
        ]);

        // Days without punches stay in the JSON output but only clutter a
        // terminal table.
        for day in report.entries.iter().filter(|d| d.metrics.sessions_on_date > 0) {
            table.add_row(vec![
                day.date.to_string(),
                format_hours(day.metrics.total_work_hours),
                format_minutes(day.metrics.total_break_minutes),
                format_minutes(day.metrics.significant_idle_minutes),
                format_hours(day.metrics.actual_working_hours),
                format_hours(day.metrics.final_working_hours),
                day.metrics.sessions_on_date.to_string(),
            ]);
        }

        println!("{table}");

        let total_final: f64 = report
            .entries
            .iter()
            .map(|d| d.metrics.final_working_hours)
            .sum();
        let active_days = report
            .entries
            .iter()
            .filter(|d| d.metrics.sessions_on_date > 0)
            .count();
        println!(
            "\nActive days: {} | Final hours total: {}",
            active_days,
            format_hours(total_final)
        );

        if benchmark {
            print_benchmark(report.processing_time_ms);
        }
    }

    Ok(())
}

fn run_usage_report(
    dir: Option<String>,
    kind: UsageKind,
    employee: Option<String>,
    since: Option<String>,
    until: Option<String>,
    top: usize,
    json: bool,
) -> Result<()> {
    use timecard_core::get_usage_report;

    let since = since.as_deref().map(parse_date).transpose()?;
    let until = until.as_deref().map(parse_date).transpose()?;

    let report = get_usage_report(
        ReportOptions {
            data_dir: dir,
            employee,
            since,
            until,
            top: Some(top),
            ..ReportOptions::default()
        },
        kind,
    )?;

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct UsageEntryJson {
            key: String,
            total: i64,
            events: i32,
        }

        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct UsageJson {
            entries: Vec<UsageEntryJson>,
            total: i64,
            total_events: i32,
            processing_time_ms: u32,
        }

        let output = UsageJson {
            entries: report
                .entries
                .iter()
                .map(|e| UsageEntryJson {
                    key: e.key.clone(),
                    total: e.total,
                    events: e.events,
                })
                .collect(),
            total: report.total,
            total_events: report.total_events,
            processing_time_ms: report.processing_time_ms,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        use comfy_table::{ContentArrangement, Table};

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);

        match kind {
            UsageKind::Applications => {
                table.set_header(vec!["#", "Application", "Time", "Windows"]);
                for (rank, entry) in report.entries.iter().enumerate() {
                    table.add_row(vec![
                        (rank + 1).to_string(),
                        entry.key.clone(),
                        format_duration(entry.total),
                        entry.events.to_string(),
                    ]);
                }
            }
            UsageKind::Domains => {
                table.set_header(vec!["#", "Domain", "Visits"]);
                for (rank, entry) in report.entries.iter().enumerate() {
                    table.add_row(vec![
                        (rank + 1).to_string(),
                        entry.key.clone(),
                        entry.total.to_string(),
                    ]);
                }
            }
        }

        println!("{table}");

        match kind {
            UsageKind::Applications => {
                println!("\nTotal: {}", format_duration(report.total));
            }
            UsageKind::Domains => {
                println!("\nTotal visits: {}", report.total);
            }
        }
    }

    Ok(())
}

fn run_sources_command(dir: Option<String>, json: bool) -> Result<()> {
    use timecard_core::{resolve_data_dir, scanner};

    let data_dir = resolve_data_dir(&dir)?;
    let scan = scanner::scan_data_dir(&data_dir);

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SourcesJson {
            data_dir: String,
            punch_files: usize,
            inactivity_files: usize,
            web_files: usize,
            app_files: usize,
            employee_files: usize,
            total_files: usize,
        }

        let output = SourcesJson {
            data_dir: data_dir.display().to_string(),
            punch_files: scan.punch_files.len(),
            inactivity_files: scan.inactivity_files.len(),
            web_files: scan.web_files.len(),
            app_files: scan.app_files.len(),
            employee_files: scan.employee_files.len(),
            total_files: scan.total_files(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("\nData directory: {}\n", data_dir.display());
        println!("  Punch logs:       {}", scan.punch_files.len());
        println!("  Inactivity logs:  {}", scan.inactivity_files.len());
        println!("  Web logs:         {}", scan.web_files.len());
        println!("  Application logs: {}", scan.app_files.len());
        println!("  Employee configs: {}", scan.employee_files.len());
        println!("\nTotal: {} export files", scan.total_files());
    }

    Ok(())
}

fn print_benchmark(processing_time_ms: u32) {
    use colored::Colorize;
    println!(
        "{}",
        format!("  Processing time: {}ms", processing_time_ms).bright_black()
    );
}

fn format_hours(hours: f64) -> String {
    format!("{:.2}h", hours)
}

fn format_minutes(minutes: f64) -> String {
    format!("{:.0}m", minutes)
}

fn format_time(ts: chrono::NaiveDateTime) -> String {
    ts.format("%H:%M").to_string()
}

fn format_date_time(ts: chrono::NaiveDateTime) -> String {
    ts.format("%d/%m/%Y %H:%M").to_string()
}

fn format_duration(seconds: i64) -> String {
    if seconds >= 3600 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else if seconds >= 60 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}s", seconds)
    }
}
