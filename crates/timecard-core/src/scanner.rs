//! Export-file discovery.
//!
//! Finds recorder export files under a data directory by filename prefix:
//! `punch*`, `inactivity*`/`idle*`, `web*`, `app*`, `employees*`, each as
//! `.json` or `.jsonl`.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExportKind {
    Punch,
    Inactivity,
    WebLog,
    AppLog,
    Employee,
}

/// Result of scanning one data directory.
#[derive(Debug, Default)]
pub struct ExportScan {
    pub punch_files: Vec<PathBuf>,
    pub inactivity_files: Vec<PathBuf>,
    pub web_files: Vec<PathBuf>,
    pub app_files: Vec<PathBuf>,
    pub employee_files: Vec<PathBuf>,
}

impl ExportScan {
    pub fn total_files(&self) -> usize {
        self.punch_files.len()
            + self.inactivity_files.len()
            + self.web_files.len()
            + self.app_files.len()
            + self.employee_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_files() == 0
    }
}

/// Classify one file name, or `None` when it is not a recognized export.
pub fn classify(file_name: &str) -> Option<ExportKind> {
    let lower = file_name.to_ascii_lowercase();

    let stem = lower
        .strip_suffix(".jsonl")
        .or_else(|| lower.strip_suffix(".json"))?;

    if stem.starts_with("punch") {
        Some(ExportKind::Punch)
    } else if stem.starts_with("inactivity") || stem.starts_with("idle") {
        Some(ExportKind::Inactivity)
    } else if stem.starts_with("web") {
        Some(ExportKind::WebLog)
    } else if stem.starts_with("app") {
        Some(ExportKind::AppLog)
    } else if stem.starts_with("employee") {
        Some(ExportKind::Employee)
    } else {
        None
    }
}

/// Recursively scan `dir` for export files, grouped by kind.
///
/// A missing directory yields an empty scan. File order within each kind is
/// sorted so repeated scans load records deterministically.
pub fn scan_data_dir(dir: &Path) -> ExportScan {
    if !dir.exists() {
        return ExportScan::default();
    }

    let mut found: Vec<(ExportKind, PathBuf)> = WalkDir::new(dir)
        .into_iter()
        .par_bridge()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let name = entry.path().file_name().and_then(|n| n.to_str())?;
            classify(name).map(|kind| (kind, entry.into_path()))
        })
        .collect();

    found.sort();

    let mut scan = ExportScan::default();
    for (kind, path) in found {
        match kind {
            ExportKind::Punch => scan.punch_files.push(path),
            ExportKind::Inactivity => scan.inactivity_files.push(path),
            ExportKind::WebLog => scan.web_files.push(path),
            ExportKind::AppLog => scan.app_files.push(path),
            ExportKind::Employee => scan.employee_files.push(path),
        }
    }
    scan
}
