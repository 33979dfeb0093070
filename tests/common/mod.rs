#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated directory that outlives the calling test.
pub fn test_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Weekly pattern on top of a slow upward trend; weekends sell more.
pub fn daily_revenue(day: NaiveDate, index: i64) -> f64 {
    let weekend = if day.weekday().number_from_monday() >= 6 { 80.0 } else { 0.0 };
    500.0 + index as f64 * 0.2 + weekend
}

/// Writes a `Sales` sheet with one text-dated row per day plus a few junk rows.
pub fn write_sales_workbook(path: &Path, start: NaiveDate, days: i64) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sales").expect("sheet name");
    sheet.write_string(0, 0, "Date").expect("header");
    sheet.write_string(0, 1, "Revenue").expect("header");

    let mut row = 1u32;
    for index in 0..days {
        let day = start + Duration::days(index);
        sheet
            .write_string(row, 0, day.format("%Y-%m-%d").to_string())
            .expect("date cell");
        sheet
            .write_number(row, 1, daily_revenue(day, index))
            .expect("revenue cell");
        row += 1;
    }
    sheet.write_string(row, 0, "not a date").expect("junk date");
    sheet.write_number(row, 1, 10.0).expect("junk revenue");
    sheet.write_string(row + 1, 0, "2024-02-30").expect("impossible date");
    sheet.write_string(row + 1, 1, "abc").expect("junk revenue");

    workbook.save(path).expect("save workbook");
}
