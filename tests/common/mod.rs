//! Shared test fixtures for the rate history integration tests.
//!
//! Provides `setup_sample_history()` which writes a small sample CSV into a
//! temporary data directory and opens a `RateHistory` over it.

#![allow(dead_code)]

use chrono::NaiveDateTime;
use rate_history::{RateHistory, RateRecord};
use std::fs;
use std::path::Path;

pub const HEADER: &str = "date_time,EURbuy,EURsell,USDbuy,USDsell";

/// Five well-formed rows, one per day at 09:00, in timestamp order.
///
/// EURbuy ties between 2024-01-02 and 2024-01-04 (4.35) for sort stability
/// checks.
pub const SAMPLE_CSV: &str = "\
date_time,EURbuy,EURsell,USDbuy,USDsell
2024-01-01 09:00:00,4.30,4.40,3.95,4.05
2024-01-02 09:00:00,4.35,4.45,4.00,4.10
2024-01-03 09:00:00,4.28,4.38,3.90,4.00
2024-01-04 09:00:00,4.35,4.46,4.02,4.12
2024-01-05 09:00:00,4.40,4.50,3.98,4.08
";

/// Install a test subscriber once so `tracing` output shows up in failures.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp.
pub fn ts(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// The rows of [`SAMPLE_CSV`] as records.
pub fn sample_records() -> Vec<RateRecord> {
    vec![
        RateRecord::new(ts("2024-01-01 09:00:00"), 4.30, 4.40, 3.95, 4.05),
        RateRecord::new(ts("2024-01-02 09:00:00"), 4.35, 4.45, 4.00, 4.10),
        RateRecord::new(ts("2024-01-03 09:00:00"), 4.28, 4.38, 3.90, 4.00),
        RateRecord::new(ts("2024-01-04 09:00:00"), 4.35, 4.46, 4.02, 4.12),
        RateRecord::new(ts("2024-01-05 09:00:00"), 4.40, 4.50, 3.98, 4.08),
    ]
}

/// Timestamps of `records` as strings, for compact order assertions.
pub fn dates(records: &[RateRecord]) -> Vec<String> {
    records.iter().map(|r| r.date_time()).collect()
}

/// Create a `RateHistory` over a temporary directory containing [`SAMPLE_CSV`].
///
/// Returns `(RateHistory, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test so the data directory is
/// not deleted prematurely.
pub fn setup_sample_history() -> (RateHistory, tempfile::TempDir) {
    setup_history_with(SAMPLE_CSV)
}

/// Like [`setup_sample_history`] but with caller-supplied file contents.
pub fn setup_history_with(csv: &str) -> (RateHistory, tempfile::TempDir) {
    init_tracing();
    let tmp_dir = tempfile::tempdir().unwrap();
    write_data_file(tmp_dir.path(), csv);
    let history = RateHistory::builder()
        .data_dir(tmp_dir.path())
        .build()
        .unwrap();
    (history, tmp_dir)
}

/// A `RateHistory` whose data file does not exist yet.
pub fn setup_empty_history() -> (RateHistory, tempfile::TempDir) {
    init_tracing();
    let tmp_dir = tempfile::tempdir().unwrap();
    let history = RateHistory::builder()
        .data_dir(tmp_dir.path())
        .build()
        .unwrap();
    (history, tmp_dir)
}

pub fn write_data_file(dir: &Path, contents: &str) {
    fs::write(dir.join("history.csv"), contents).unwrap();
}

pub fn read_data_file(dir: &Path) -> String {
    fs::read_to_string(dir.join("history.csv")).unwrap()
}
